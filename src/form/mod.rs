//! # Signature Form
//!
//! The candidate form state as the user types it: plain strings and toggles,
//! possibly invalid. The same type is what the JSON/TOML input files and the
//! HTTP API carry, with the camelCase keys of the web form.
//!
//! ```
//! use signet::form::{SignatureForm, validate};
//!
//! let form: SignatureForm = serde_json::from_str(r#"{"name": "Ada", "fontSize": "14"}"#).unwrap();
//! assert!(validate(&form).is_empty());
//! let model = form.to_model().unwrap();
//! assert_eq!(model.font_size, 14);
//! ```

pub mod controller;
mod field;
mod validate;

pub use controller::{EditError, FieldValue, FormController};
pub use field::{AssetList, Field, FieldKind, FieldPath, UnknownField};
pub use validate::{ErrorMap, FieldError, URL_SCHEMES, validate};

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::SignetError;
use crate::model::{
    Asset, Border, Color, DEFAULT_FONT_SIZE, IconAlignment, IconLayout, IconPosition,
    MAX_BORDER_WIDTH, MAX_FONT_SIZE, MIN_BORDER_WIDTH, MIN_FONT_SIZE, SignatureModel,
};
use validate::parse_integer;

/// Placeholder URL for a newly added primary image.
pub const NEW_IMAGE_URL: &str = "https://placehold.co/200x200";
/// Placeholder URL for a newly added icon.
pub const NEW_ICON_URL: &str = "https://placehold.co/25x25";

/// One image or icon entry as entered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetInput {
    pub url: String,
    pub alt_text: String,
}

impl AssetInput {
    pub fn new(url: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt_text: alt_text.into(),
        }
    }
}

/// Candidate signature data. Missing keys take the form's defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureForm {
    pub name: String,
    pub title: String,
    pub company: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub image: Vec<AssetInput>,
    pub icons: Vec<AssetInput>,
    pub icon_position: String,
    pub icon_alignment: String,
    pub include_background: bool,
    pub background_color: String,
    pub include_border: bool,
    pub border_color: String,
    pub border_width: String,
    pub font_size: String,
}

impl Default for SignatureForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            company: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            image: Vec::new(),
            icons: Vec::new(),
            icon_position: IconPosition::Right.as_str().to_string(),
            icon_alignment: IconAlignment::Center.as_str().to_string(),
            include_background: true,
            background_color: "#ffffffff".to_string(),
            include_border: false,
            border_color: "#000000".to_string(),
            border_width: MIN_BORDER_WIDTH.to_string(),
            font_size: DEFAULT_FONT_SIZE.to_string(),
        }
    }
}

impl SignatureForm {
    /// Read a form from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self, SignetError> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            _ => Self::from_json(&contents),
        }
    }

    pub fn from_json(s: &str) -> Result<Self, SignetError> {
        serde_json::from_str(s).map_err(|e| SignetError::Parse(format!("invalid JSON form: {}", e)))
    }

    pub fn from_toml(s: &str) -> Result<Self, SignetError> {
        toml::from_str(s).map_err(|e| SignetError::Parse(format!("invalid TOML form: {}", e)))
    }

    /// Apply field-exit normalization: empty or out-of-range numbers are
    /// replaced, everything else is left for the validator.
    ///
    /// Returns true when the stored value changed.
    pub fn normalize(&mut self, field: Field) -> bool {
        let (value, floor, ceiling, empty_default) = match field {
            Field::FontSize => (
                &mut self.font_size,
                MIN_FONT_SIZE,
                MAX_FONT_SIZE,
                DEFAULT_FONT_SIZE,
            ),
            Field::BorderWidth => (
                &mut self.border_width,
                MIN_BORDER_WIDTH,
                MAX_BORDER_WIDTH,
                MIN_BORDER_WIDTH,
            ),
            _ => return false,
        };

        let replacement = if value.trim().is_empty() {
            Some(empty_default)
        } else {
            match parse_integer(value) {
                Some(n) if n < i64::from(floor) => Some(floor),
                Some(n) if n > i64::from(ceiling) => Some(ceiling),
                _ => None,
            }
        };

        match replacement {
            Some(n) => {
                *value = n.to_string();
                true
            }
            None => false,
        }
    }

    /// Normalize every numeric field, as if each had been left once.
    pub fn normalize_all(&mut self) {
        self.normalize(Field::FontSize);
        self.normalize(Field::BorderWidth);
    }

    pub fn assets(&self, list: AssetList) -> &[AssetInput] {
        match list {
            AssetList::Image => &self.image,
            AssetList::Icons => &self.icons,
        }
    }

    pub fn assets_mut(&mut self, list: AssetList) -> &mut Vec<AssetInput> {
        match list {
            AssetList::Image => &mut self.image,
            AssetList::Icons => &mut self.icons,
        }
    }

    /// Validate and, only when no rule is violated, build the typed model.
    pub fn to_model(&self) -> Result<SignatureModel, ErrorMap> {
        let errors = validate(self);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(self.build_model())
    }

    /// Build the model from a candidate already known to be valid.
    fn build_model(&self) -> SignatureModel {
        let icon_layout = match self.icon_position.parse() {
            Ok(IconPosition::Bottom) => {
                IconLayout::Bottom(self.icon_alignment.parse().unwrap_or_default())
            }
            _ => IconLayout::Right,
        };

        let background = self
            .include_background
            .then(|| self.background_color.parse::<Color>().ok())
            .flatten();

        let border = if self.include_border {
            self.border_color.parse::<Color>().ok().map(|color| Border {
                color,
                width: clamp_to_range(&self.border_width, MIN_BORDER_WIDTH, MAX_BORDER_WIDTH),
            })
        } else {
            None
        };

        SignatureModel {
            name: self.name.clone(),
            title: self.title.clone(),
            company: self.company.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            website: self.website.clone(),
            image: self.image.first().and_then(to_asset),
            icons: self.icons.iter().filter_map(to_asset).collect(),
            icon_layout,
            background,
            border,
            font_size: clamp_to_range(&self.font_size, MIN_FONT_SIZE, MAX_FONT_SIZE),
        }
    }
}

fn to_asset(input: &AssetInput) -> Option<Asset> {
    Url::parse(&input.url).ok().map(|url| Asset {
        url,
        alt_text: input.alt_text.clone(),
    })
}

fn clamp_to_range(raw: &str, floor: u32, ceiling: u32) -> u32 {
    parse_integer(raw)
        .map(|n| n.clamp(i64::from(floor), i64::from(ceiling)))
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(floor)
}
