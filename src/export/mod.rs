//! # Export Sinks
//!
//! Converts a rendered signature into the artifacts a user takes away:
//! rich text for the clipboard, a PNG/JPEG picture, or an SVG.
//!
//! ```text
//! RenderTree ─┬─> export_rich_text ─> {plain_text, html}
//!             │
//!             └─> resolve_images (ImageSource) ─> ImageSet
//!                        │
//!                        ├─> layout ─> paint ─> PNG / JPEG
//!                        └─> layout ─> SVG <foreignObject>
//! ```
//!
//! Exports never feed back into the form; a failure is reported and the
//! user retries.

mod font;
pub mod images;
pub mod layout;
mod raster;
mod vector;

pub use images::{HttpImageSource, ImageSet, ImageSource, StaticImageSource, resolve_images};
pub use raster::JPEG_QUALITY;

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::render::RenderTree;

/// Base name of downloaded files.
pub const FILE_STEM: &str = "email-signature";

/// Largest canvas the rasterizer will allocate, in pixels.
pub const MAX_CANVAS_PIXELS: u64 = 16_000_000;

/// Errors from export sinks.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown export format '{0}' (expected png, jpeg or svg)")]
    UnknownFormat(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("signature is too large to rasterize ({width}x{height} px)")]
    TooLarge { width: u32, height: u32 },
}

/// Downloadable file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Svg,
}

/// Formats produced by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
        }
    }

    /// `email-signature.<ext>`
    pub fn file_name(self) -> String {
        format!("{}.{}", FILE_STEM, self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "svg" => Ok(ExportFormat::Svg),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Clipboard payload: both flavours a paste target may ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichText {
    pub plain_text: String,
    pub html: String,
}

pub fn export_rich_text(tree: &RenderTree) -> RichText {
    RichText {
        plain_text: tree.to_plain_text(),
        html: tree.to_html(),
    }
}

/// Rasterize `tree`. Images missing from `images` are drawn as placeholders.
pub fn export_raster(
    tree: &RenderTree,
    format: RasterFormat,
    images: &ImageSet,
) -> Result<Vec<u8>, ExportError> {
    let layout = layout::layout(tree, images);
    if u64::from(layout.width) * u64::from(layout.height) > MAX_CANVAS_PIXELS {
        return Err(ExportError::TooLarge {
            width: layout.width,
            height: layout.height,
        });
    }
    debug!(width = layout.width, height = layout.height, ?format, "rasterizing");
    let canvas = raster::paint(&layout, images);
    raster::encode(&canvas, format)
}

/// SVG document. `images` is only used to size the layout.
pub fn export_vector(tree: &RenderTree, images: &ImageSet) -> Vec<u8> {
    let layout = layout::layout(tree, images);
    vector::to_svg(tree, &layout).into_bytes()
}

/// Produce file bytes for any downloadable format.
pub fn export(
    tree: &RenderTree,
    format: ExportFormat,
    images: &ImageSet,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Png => export_raster(tree, RasterFormat::Png, images),
        ExportFormat::Jpeg => export_raster(tree, RasterFormat::Jpeg, images),
        ExportFormat::Svg => Ok(export_vector(tree, images)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SignatureModel;
    use crate::render::render;

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert!(matches!(
            "gif".parse::<ExportFormat>(),
            Err(ExportError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(ExportFormat::Png.file_name(), "email-signature.png");
        assert_eq!(ExportFormat::Jpeg.file_name(), "email-signature.jpeg");
        assert_eq!(ExportFormat::Svg.file_name(), "email-signature.svg");
    }

    #[test]
    fn test_rich_text_carries_both_flavours() {
        let mut model = SignatureModel::named("Ada");
        model.phone = "555".into();
        let tree = render(&model);
        let rich = export_rich_text(&tree);
        assert_eq!(rich.plain_text, "Ada\n555");
        assert_eq!(rich.html, tree.to_html());
    }

    #[test]
    fn test_oversized_canvas_is_refused() {
        let mut model = SignatureModel::named("x".repeat(20_000));
        model.font_size = crate::model::MAX_FONT_SIZE;
        let tree = render(&model);
        assert!(matches!(
            export(&tree, ExportFormat::Png, &ImageSet::new()),
            Err(ExportError::TooLarge { .. })
        ));
        // Vector export has no canvas and still succeeds.
        assert!(export(&tree, ExportFormat::Svg, &ImageSet::new()).is_ok());
    }

    #[test]
    fn test_png_decodes_at_layout_size() {
        let tree = render(&SignatureModel::named("Ada"));
        let bytes = export(&tree, ExportFormat::Png, &ImageSet::new()).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (34, 31));
    }
}
