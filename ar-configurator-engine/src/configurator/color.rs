use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 24-bit sRGB colour as picked from a swatch. Serialises as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorHex(u32);

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("colour '{0}' must have exactly six hex digits")]
    Length(String),

    #[error("colour '{0}' is not valid hexadecimal")]
    Digits(String),
}

impl ColorHex {
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }

    /// Accepts `#rrggbb`, `rrggbb` and `0xrrggbb`.
    pub fn parse(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.len() != 6 {
            return Err(ColorParseError::Length(input.to_string()));
        }
        // from_str_radix alone would let a leading sign through.
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digits(input.to_string()));
        }

        u32::from_str_radix(digits, 16)
            .map(Self::new)
            .map_err(|_| ColorParseError::Digits(input.to_string()))
    }

    pub fn to_hex_string(&self) -> String {
        format!("#{:06x}", self.0)
    }

    pub fn to_color_with_alpha(&self, alpha: f32) -> Color {
        let channel = |shift: u32| ((self.0 >> shift) & 0xff) as f32 / 255.0;
        Color::srgba(channel(16), channel(8), channel(0), alpha)
    }
}

impl fmt::Display for ColorHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl TryFrom<String> for ColorHex {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColorHex> for String {
    fn from(value: ColorHex) -> Self {
        value.to_hex_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_notations() {
        assert_eq!(ColorHex::parse("#3b82f6"), Ok(ColorHex::new(0x3b82f6)));
        assert_eq!(ColorHex::parse("3B82F6"), Ok(ColorHex::new(0x3b82f6)));
        assert_eq!(ColorHex::parse("0x22c55e"), Ok(ColorHex::new(0x22c55e)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(ColorHex::parse("#fff"), Err(ColorParseError::Length(_))));
        assert!(matches!(ColorHex::parse("#zzzzzz"), Err(ColorParseError::Digits(_))));
    }

    #[test]
    fn rejects_signed_digits() {
        assert!(matches!(ColorHex::parse("#+abcde"), Err(ColorParseError::Digits(_))));
        assert!(matches!(ColorHex::parse("-abcde"), Err(ColorParseError::Digits(_))));
    }

    #[test]
    fn formats_lowercase_with_hash() {
        assert_eq!(ColorHex::new(0x111827).to_hex_string(), "#111827");
        assert_eq!(
            serde_json::to_string(&ColorHex::new(0xEF4444)).unwrap(),
            "\"#ef4444\""
        );
    }
}
