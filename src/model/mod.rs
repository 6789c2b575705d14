//! # Signature Model
//!
//! The canonical, validated representation of a signature. A `SignatureModel`
//! only exists once every field has passed validation; it is built by
//! [`crate::form::SignatureForm::to_model`] and consumed by
//! [`crate::render::render`].
//!
//! Conditional fields are encoded in the types: an icon alignment only exists
//! for [`IconLayout::Bottom`], a background color only when a background is
//! enabled, a border width only when a border is enabled.

mod color;

pub use color::{Color, ParseColorError};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Smallest committed font size, in pixels.
pub const MIN_FONT_SIZE: u32 = 10;
/// Font size used when the field is left empty.
pub const DEFAULT_FONT_SIZE: u32 = 12;
/// Largest committed font size, in pixels.
pub const MAX_FONT_SIZE: u32 = 72;
/// Smallest committed border width, in pixels.
pub const MIN_BORDER_WIDTH: u32 = 1;
/// Largest committed border width, in pixels.
pub const MAX_BORDER_WIDTH: u32 = 20;
/// Maximum number of primary images.
pub const MAX_IMAGES: usize = 1;
/// Maximum number of icons.
pub const MAX_ICONS: usize = 5;

/// An image reference with its accessibility text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub url: Url,
    pub alt_text: String,
}

/// Where icons are placed relative to the main content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconPosition {
    #[default]
    Right,
    Bottom,
}

impl IconPosition {
    pub const ALL: &'static [&'static str] = &["right", "bottom"];

    pub fn as_str(self) -> &'static str {
        match self {
            IconPosition::Right => "right",
            IconPosition::Bottom => "bottom",
        }
    }
}

impl FromStr for IconPosition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "right" => Ok(IconPosition::Right),
            "bottom" => Ok(IconPosition::Bottom),
            _ => Err(()),
        }
    }
}

/// Horizontal justification of a bottom icon row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconAlignment {
    Start,
    #[default]
    Center,
    End,
}

impl IconAlignment {
    pub const ALL: &'static [&'static str] = &["start", "center", "end"];

    pub fn as_str(self) -> &'static str {
        match self {
            IconAlignment::Start => "start",
            IconAlignment::Center => "center",
            IconAlignment::End => "end",
        }
    }
}

impl FromStr for IconAlignment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(IconAlignment::Start),
            "center" => Ok(IconAlignment::Center),
            "end" => Ok(IconAlignment::End),
            _ => Err(()),
        }
    }
}

/// Icon placement. Alignment is only meaningful below the content, so it only
/// exists on the `Bottom` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "position", content = "alignment", rename_all = "lowercase")]
pub enum IconLayout {
    #[default]
    Right,
    Bottom(IconAlignment),
}

impl IconLayout {
    pub fn position(self) -> IconPosition {
        match self {
            IconLayout::Right => IconPosition::Right,
            IconLayout::Bottom(_) => IconPosition::Bottom,
        }
    }
}

/// Outer border settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Border {
    pub color: Color,
    pub width: u32,
}

/// A fully validated signature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureModel {
    pub name: String,
    pub title: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub image: Option<Asset>,
    pub icons: Vec<Asset>,
    pub icon_layout: IconLayout,
    pub background: Option<Color>,
    pub border: Option<Border>,
    pub font_size: u32,
}

impl SignatureModel {
    /// A model with only a name set and every option at its default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            company: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            image: None,
            icons: Vec::new(),
            icon_layout: IconLayout::Right,
            background: None,
            border: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }

    /// Whether any contact line (phone, email, website) is present.
    pub fn has_contact_details(&self) -> bool {
        !(self.phone.is_empty() && self.email.is_empty() && self.website.is_empty())
    }

    /// Font size for secondary lines (title, company).
    pub fn secondary_font_size(&self) -> u32 {
        self.font_size.saturating_sub(2)
    }
}

impl fmt::Display for SignatureModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for part in [&self.title, &self.company] {
            if !part.is_empty() {
                write!(f, ", {}", part)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_defaults() {
        let model = SignatureModel::named("Ada");
        assert_eq!(model.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(model.icon_layout, IconLayout::Right);
        assert!(!model.has_contact_details());
    }

    #[test]
    fn test_secondary_font_size() {
        let mut model = SignatureModel::named("Ada");
        model.font_size = 16;
        assert_eq!(model.secondary_font_size(), 14);
    }

    #[test]
    fn test_enum_round_trip_strings() {
        for s in IconPosition::ALL {
            assert_eq!(s.parse::<IconPosition>().unwrap().as_str(), *s);
        }
        for s in IconAlignment::ALL {
            assert_eq!(s.parse::<IconAlignment>().unwrap().as_str(), *s);
        }
        assert!("left".parse::<IconPosition>().is_err());
    }

    #[test]
    fn test_display() {
        let mut model = SignatureModel::named("Ada Lovelace");
        model.company = "Analytical Engines".into();
        assert_eq!(model.to_string(), "Ada Lovelace, Analytical Engines");
    }
}
