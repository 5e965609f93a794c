//! Display colors for severity bins.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// An RGBA display color.
///
/// In configuration files a color may be written as a hex string
/// (`"#RRGGBB"` / `"#RRGGBBAA"`), a named color (`"red"`, `"orange"`, ...),
/// or an array (`[r, g, b]` / `[r, g, b, a]`). Serializes back to hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    /// Hex string, `#RRGGBB` when fully opaque, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse a `#RRGGBB` / `#RRGGBBAA` hex string.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ColorParseError::InvalidHex(s.to_string()));
        }
        let parse_pair = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ColorParseError::InvalidHex(s.to_string()))
        };
        match hex.len() {
            6 => Ok(Self::opaque(
                parse_pair(0..2)?,
                parse_pair(2..4)?,
                parse_pair(4..6)?,
            )),
            8 => Ok(Self::new(
                parse_pair(0..2)?,
                parse_pair(2..4)?,
                parse_pair(4..6)?,
                parse_pair(6..8)?,
            )),
            _ => Err(ColorParseError::InvalidHex(s.to_string())),
        }
    }

    /// Resolve a CSS-style color name. Unknown names are an error so that a
    /// misspelled configuration fails at load time instead of rendering
    /// black.
    pub fn from_name(name: &str) -> Result<Self, ColorParseError> {
        let rgba = match name.to_lowercase().as_str() {
            "transparent" => (0, 0, 0, 0),
            "black" => (0, 0, 0, 255),
            "white" => (255, 255, 255, 255),
            "red" => (255, 0, 0, 255),
            "green" => (0, 128, 0, 255),
            "blue" => (0, 0, 255, 255),
            "yellow" => (255, 255, 0, 255),
            "cyan" => (0, 255, 255, 255),
            "magenta" => (255, 0, 255, 255),
            "orange" => (255, 165, 0, 255),
            "purple" => (128, 0, 128, 255),
            "brown" => (139, 69, 19, 255),
            "tan" => (210, 180, 140, 255),
            "gray" | "grey" => (128, 128, 128, 255),
            _ => return Err(ColorParseError::UnknownName(name.to_string())),
        };
        Ok(Self::new(rgba.0, rgba.1, rgba.2, rgba.3))
    }

    fn from_str(s: &str) -> Result<Self, ColorParseError> {
        if s.starts_with('#') {
            Self::from_hex(s)
        } else {
            Self::from_name(s)
        }
    }

    fn from_array(arr: &[u8]) -> Result<Self, ColorParseError> {
        match arr {
            [r, g, b] => Ok(Self::opaque(*r, *g, *b)),
            [r, g, b, a] => Ok(Self::new(*r, *g, *b, *a)),
            _ => Err(ColorParseError::InvalidArray(arr.len())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorParseError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Unknown color name: {0}")]
    UnknownName(String),

    #[error("Color array must have 3 or 4 components, got {0}")]
    InvalidArray(usize),
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Array(Vec<u8>),
        }

        let repr = Repr::deserialize(deserializer)?;
        let color = match &repr {
            Repr::Text(s) => Color::from_str(s),
            Repr::Array(arr) => Color::from_array(arr),
        };
        color.map_err(de::Error::custom)
    }
}
