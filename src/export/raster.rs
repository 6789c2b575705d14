//! PNG and JPEG export.
//!
//! Paints a [`Layout`] onto an RGBA canvas. PNG keeps the transparent
//! surround; JPEG is flattened onto white first.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use super::font::{GlyphCache, glyph_width};
use super::images::ImageSet;
use super::layout::{Item, Layout, Rect};
use super::{ExportError, RasterFormat};

/// JPEG quality, 0–100.
pub const JPEG_QUALITY: u8 = 95;

const PLACEHOLDER_FILL: [u8; 4] = [0xee, 0xee, 0xee, 0xff];
const PLACEHOLDER_EDGE: [u8; 4] = [0x99, 0x99, 0x99, 0xff];

/// Paint a layout to pixels.
pub fn paint(layout: &Layout, images: &ImageSet) -> RgbaImage {
    let mut canvas = RgbaImage::new(layout.width.max(1), layout.height.max(1));
    let mut glyphs = GlyphCache::new();

    for item in &layout.items {
        match item {
            Item::Fill { rect, color } => fill(&mut canvas, *rect, *color),
            Item::Frame { rect, width, color } => frame(&mut canvas, *rect, *width, *color),
            Item::Text {
                x,
                y,
                size,
                bold,
                color,
                text,
            } => draw_text(&mut canvas, &mut glyphs, *x, *y, *size, *bold, *color, text),
            Item::Image { rect, src } => match images.get(src) {
                Some(source) => {
                    let scaled = source.resize_exact(rect.width, rect.height, FilterType::Lanczos3);
                    imageops::overlay(&mut canvas, &scaled.to_rgba8(), rect.x.into(), rect.y.into());
                }
                None => {
                    fill(&mut canvas, *rect, PLACEHOLDER_FILL);
                    frame(&mut canvas, *rect, 1, PLACEHOLDER_EDGE);
                }
            },
        }
    }

    canvas
}

/// Encode a painted canvas.
pub fn encode(canvas: &RgbaImage, format: RasterFormat) -> Result<Vec<u8>, ExportError> {
    let (width, height) = canvas.dimensions();
    let mut bytes = Vec::new();

    match format {
        RasterFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
        }
        RasterFormat::Jpeg => {
            let flat = flatten_on_white(canvas);
            JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
                .write_image(&flat, width, height, ExtendedColorType::Rgb8)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
        }
    }

    Ok(bytes)
}

/// Composite onto opaque white and drop the alpha channel.
fn flatten_on_white(canvas: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(canvas.as_raw().len() / 4 * 3);
    for Rgba([r, g, b, a]) in canvas.pixels() {
        let alpha = *a as u32;
        for channel in [r, g, b] {
            let c = (*channel as u32 * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(c as u8);
        }
    }
    rgb
}

fn blend(canvas: &mut RgbaImage, x: u32, y: u32, color: [u8; 4]) {
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }
    let [r, g, b, a] = color;
    if a == 255 {
        canvas.put_pixel(x, y, Rgba(color));
        return;
    }
    let dst = canvas.get_pixel(x, y).0;
    let sa = a as u32;
    let da = dst[3] as u32 * (255 - sa) / 255;
    let out_a = sa + da;
    if out_a == 0 {
        return;
    }
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * da) / out_a) as u8;
    canvas.put_pixel(
        x,
        y,
        Rgba([mix(r, dst[0]), mix(g, dst[1]), mix(b, dst[2]), out_a as u8]),
    );
}

fn fill(canvas: &mut RgbaImage, rect: Rect, color: [u8; 4]) {
    let bottom = rect.y.saturating_add(rect.height).min(canvas.height());
    let right = rect.x.saturating_add(rect.width).min(canvas.width());
    for y in rect.y..bottom {
        for x in rect.x..right {
            blend(canvas, x, y, color);
        }
    }
}

fn frame(canvas: &mut RgbaImage, rect: Rect, width: u32, color: [u8; 4]) {
    let w = width.min(rect.width).min(rect.height);
    let edges = [
        Rect { height: w, ..rect },
        Rect {
            y: rect.y + rect.height - w,
            height: w,
            ..rect
        },
        Rect {
            y: rect.y + w,
            width: w,
            height: rect.height.saturating_sub(2 * w),
            ..rect
        },
        Rect {
            x: rect.x + rect.width - w,
            y: rect.y + w,
            width: w,
            height: rect.height.saturating_sub(2 * w),
        },
    ];
    for edge in edges {
        fill(canvas, edge, color);
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    canvas: &mut RgbaImage,
    glyphs: &mut GlyphCache,
    x: u32,
    y: u32,
    size: u32,
    bold: bool,
    color: [u8; 4],
    text: &str,
) {
    let advance = glyph_width(size);
    // Center the glyph cell in the line box.
    let top = y + size.div_ceil(8);

    for (i, ch) in text.chars().enumerate() {
        let gx = x + i as u32 * advance;
        let glyph = glyphs.get(size, ch);
        for row in 0..glyph.height {
            for col in 0..glyph.width {
                if glyph.is_on(col, row) {
                    blend(canvas, gx + col, top + row, color);
                    // Double strike for bold.
                    if bold {
                        blend(canvas, gx + col + 1, top + row, color);
                    }
                }
            }
        }
    }
}
