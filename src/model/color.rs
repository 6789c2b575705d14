//! Hex color values accepted for backgrounds and borders.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A CSS hex color: `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
///
/// The user's spelling is kept so the rendered style declaration matches
/// what the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color {
    raw: String,
    rgba: [u8; 4],
}

impl Color {
    /// Opaque black, used for dividers.
    pub fn black() -> Self {
        Self {
            raw: "#000000".to_string(),
            rgba: [0, 0, 0, 255],
        }
    }

    /// The color as written, e.g. `#ffffffff`.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Channel values, alpha last.
    pub fn rgba(&self) -> [u8; 4] {
        self.rgba
    }
}

/// Reason a string is not a hex color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a hex color: \"{}\"", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);

        let rgba = match hex.len() {
            3 | 4 => {
                let a = if hex.len() == 4 { nibble(3) } else { Ok(255) };
                [nibble(0), nibble(1), nibble(2), a]
            }
            6 | 8 => {
                let a = if hex.len() == 8 { byte(6) } else { Ok(255) };
                [byte(0), byte(2), byte(4), a]
            }
            _ => return Err(err()),
        };

        let mut out = [0u8; 4];
        for (slot, channel) in out.iter_mut().zip(rgba) {
            *slot = channel.map_err(|_| err())?;
        }

        Ok(Self {
            raw: s.to_string(),
            rgba: out,
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
