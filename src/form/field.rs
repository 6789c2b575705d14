//! Field identities and their dotted paths (`name`, `icons.2.altText`, ...).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Dotted path to a field in the candidate form, keyed the same way the JSON
/// form is (`image.0.url`, `borderWidth`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<Field> for FieldPath {
    fn from(field: Field) -> Self {
        field.path()
    }
}

impl PartialEq<&str> for FieldPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Which list an asset entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetList {
    Image,
    Icons,
}

impl AssetList {
    pub fn key(self) -> &'static str {
        match self {
            AssetList::Image => "image",
            AssetList::Icons => "icons",
        }
    }
}

/// Every editable control in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Title,
    Company,
    Phone,
    Email,
    Website,
    AssetUrl(AssetList, usize),
    AssetAltText(AssetList, usize),
    IconPosition,
    IconAlignment,
    IncludeBackground,
    BackgroundColor,
    IncludeBorder,
    BorderColor,
    BorderWidth,
    FontSize,
}

/// The kind of value a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Toggle,
}

impl Field {
    pub fn path(self) -> FieldPath {
        let s = match self {
            Field::Name => "name",
            Field::Title => "title",
            Field::Company => "company",
            Field::Phone => "phone",
            Field::Email => "email",
            Field::Website => "website",
            Field::AssetUrl(list, i) => return FieldPath(format!("{}.{}.url", list.key(), i)),
            Field::AssetAltText(list, i) => {
                return FieldPath(format!("{}.{}.altText", list.key(), i));
            }
            Field::IconPosition => "iconPosition",
            Field::IconAlignment => "iconAlignment",
            Field::IncludeBackground => "includeBackground",
            Field::BackgroundColor => "backgroundColor",
            Field::IncludeBorder => "includeBorder",
            Field::BorderColor => "borderColor",
            Field::BorderWidth => "borderWidth",
            Field::FontSize => "fontSize",
        };
        FieldPath(s.to_string())
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::IncludeBackground | Field::IncludeBorder => FieldKind::Toggle,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Unknown or malformed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field \"{}\"", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownField(s.to_string());

        let simple = match s {
            "name" => Some(Field::Name),
            "title" => Some(Field::Title),
            "company" => Some(Field::Company),
            "phone" => Some(Field::Phone),
            "email" => Some(Field::Email),
            "website" => Some(Field::Website),
            "iconPosition" => Some(Field::IconPosition),
            "iconAlignment" => Some(Field::IconAlignment),
            "includeBackground" => Some(Field::IncludeBackground),
            "backgroundColor" => Some(Field::BackgroundColor),
            "includeBorder" => Some(Field::IncludeBorder),
            "borderColor" => Some(Field::BorderColor),
            "borderWidth" => Some(Field::BorderWidth),
            "fontSize" => Some(Field::FontSize),
            _ => None,
        };
        if let Some(field) = simple {
            return Ok(field);
        }

        let mut parts = s.split('.');
        let (Some(list), Some(index), Some(leaf), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(unknown());
        };

        let list = match list {
            "image" => AssetList::Image,
            "icons" => AssetList::Icons,
            _ => return Err(unknown()),
        };
        let index: usize = index.parse().map_err(|_| unknown())?;

        match leaf {
            "url" => Ok(Field::AssetUrl(list, index)),
            "altText" => Ok(Field::AssetAltText(list, index)),
            _ => Err(unknown()),
        }
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
