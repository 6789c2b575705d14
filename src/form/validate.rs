//! Field-level validation of a candidate form.
//!
//! Every rule is evaluated independently; the only coupling between fields is
//! relevance (alignment only matters for bottom icons, colors and widths only
//! when their toggle is on).

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

use super::field::{AssetList, Field, FieldPath};
use super::{AssetInput, SignatureForm};
use crate::model::{Color, IconAlignment, IconPosition, MAX_ICONS, MAX_IMAGES};

/// A single rule violation, scoped to one field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("This field is required.")]
    EmptyField,

    #[error("Enter a valid http or https URL.")]
    InvalidUrl,

    #[error("Expected one of: {}.", .expected.join(", "))]
    InvalidEnum { expected: &'static [&'static str] },

    #[error("Enter a whole number.")]
    NotANumber,

    #[error("At most {max} allowed.")]
    TooManyItems { max: usize },

    #[error("At least {min} required.")]
    TooFewItems { min: usize },

    #[error("Enter a hex color such as #1a2b3c.")]
    InvalidColor,
}

impl FieldError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            FieldError::EmptyField => "EmptyField",
            FieldError::InvalidUrl => "InvalidUrl",
            FieldError::InvalidEnum { .. } => "InvalidEnum",
            FieldError::NotANumber => "NotANumber",
            FieldError::TooManyItems { .. } => "TooManyItems",
            FieldError::TooFewItems { .. } => "TooFewItems",
            FieldError::InvalidColor => "InvalidColor",
        }
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("code", self.code())?;
        map.serialize_entry("message", &self.to_string())?;
        map.end()
    }
}

/// Mapping from field path to the error reported for it. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<FieldPath, FieldError>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.0.get(&FieldPath::from(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn insert(&mut self, path: impl Into<FieldPath>, error: FieldError) {
        self.0.insert(path.into(), error);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &FieldError)> {
        self.0.iter()
    }

    /// Keep only the entries whose path satisfies `keep`.
    pub fn filtered(&self, mut keep: impl FnMut(&FieldPath) -> bool) -> Self {
        Self(
            self.0
                .iter()
                .filter(|(path, _)| keep(path))
                .map(|(p, e)| (p.clone(), e.clone()))
                .collect(),
        )
    }
}

impl std::fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (path, error) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", path, error)?;
            first = false;
        }
        Ok(())
    }
}

/// Evaluate every rule against the candidate and collect violations.
pub fn validate(form: &SignatureForm) -> ErrorMap {
    let mut errors = ErrorMap::new();

    if form.name.is_empty() {
        errors.insert(Field::Name, FieldError::EmptyField);
    }

    check_assets(&mut errors, AssetList::Image, &form.image, MAX_IMAGES);
    check_assets(&mut errors, AssetList::Icons, &form.icons, MAX_ICONS);

    match form.icon_position.parse::<IconPosition>() {
        Ok(IconPosition::Bottom) => {
            if form.icon_alignment.parse::<IconAlignment>().is_err() {
                errors.insert(
                    Field::IconAlignment,
                    FieldError::InvalidEnum {
                        expected: IconAlignment::ALL,
                    },
                );
            }
        }
        Ok(IconPosition::Right) => {}
        Err(()) => errors.insert(
            Field::IconPosition,
            FieldError::InvalidEnum {
                expected: IconPosition::ALL,
            },
        ),
    }

    if form.include_background && form.background_color.parse::<Color>().is_err() {
        errors.insert(Field::BackgroundColor, FieldError::InvalidColor);
    }

    if form.include_border {
        if form.border_color.parse::<Color>().is_err() {
            errors.insert(Field::BorderColor, FieldError::InvalidColor);
        }
        if parse_integer(&form.border_width).is_none() {
            errors.insert(Field::BorderWidth, FieldError::NotANumber);
        }
    }

    if parse_integer(&form.font_size).is_none() {
        errors.insert(Field::FontSize, FieldError::NotANumber);
    }

    errors
}

fn check_assets(errors: &mut ErrorMap, list: AssetList, entries: &[AssetInput], max: usize) {
    if let Some(error) = check_len(entries.len(), 0, max) {
        errors.insert(list.key(), error);
    }

    for (i, entry) in entries.iter().enumerate() {
        if !is_web_url(&entry.url) {
            errors.insert(Field::AssetUrl(list, i), FieldError::InvalidUrl);
        }
        if entry.alt_text.is_empty() {
            errors.insert(Field::AssetAltText(list, i), FieldError::EmptyField);
        }
    }
}

fn check_len(len: usize, min: usize, max: usize) -> Option<FieldError> {
    if len > max {
        Some(FieldError::TooManyItems { max })
    } else if len < min {
        Some(FieldError::TooFewItems { min })
    } else {
        None
    }
}

/// Schemes an image URL may use.
pub const URL_SCHEMES: [&str; 2] = ["http", "https"];

/// An absolute `http`/`https` URL with a host. Relative input fails to parse
/// with `RelativeUrlWithoutBase`.
pub(crate) fn is_web_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|url| URL_SCHEMES.contains(&url.scheme()) && url.has_host())
}

/// Parse an integer field, tolerating surrounding whitespace.
pub(crate) fn parse_integer(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}
