//! # Colors
//!
//! CSS color strings as they arrive from telemetry, parsed into linear RGBA components.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Opaque color from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a,
        }
    }

    fn parse_hex(hex: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidHex(format!("#{hex}"));
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| invalid());
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

        match hex.len() {
            3 | 4 => {
                let r = nibble(0)? * 17;
                let g = nibble(1)? * 17;
                let b = nibble(2)? * 17;
                let a = if hex.len() == 4 { nibble(3)? * 17 } else { 255 };
                Ok(Self::rgba(r, g, b, a as f32 / 255.0))
            }
            6 | 8 => {
                let r = byte(0)?;
                let g = byte(2)?;
                let b = byte(4)?;
                let a = if hex.len() == 8 { byte(6)? } else { 255 };
                Ok(Self::rgba(r, g, b, a as f32 / 255.0))
            }
            _ => Err(invalid()),
        }
    }

    fn parse_function(s: &str) -> Result<Self, ColorParseError> {
        let invalid = || ColorParseError::InvalidFunction(s.to_string());
        let (name, rest) = s.split_once('(').ok_or_else(invalid)?;
        let args = rest.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<f32> = args
            .split(',')
            .map(|p| p.trim().parse::<f32>().map_err(|_| invalid()))
            .collect::<Result<_, _>>()?;

        let channel = |v: f32| v.clamp(0.0, 255.0) / 255.0;
        match (name.trim(), parts.as_slice()) {
            ("rgb", [r, g, b]) => Ok(Self {
                r: channel(*r),
                g: channel(*g),
                b: channel(*b),
                a: 1.0,
            }),
            ("rgba", [r, g, b, a]) => Ok(Self {
                r: channel(*r),
                g: channel(*g),
                b: channel(*b),
                a: a.clamp(0.0, 1.0),
            }),
            _ => Err(invalid()),
        }
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Self::rgb(0, 0, 0),
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "pink" => Self::rgb(255, 192, 203),
            "brown" => Self::rgb(165, 42, 42),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "navy" => Self::rgb(0, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "maroon" => Self::rgb(128, 0, 0),
            "olive" => Self::rgb(128, 128, 0),
            "gold" => Self::rgb(255, 215, 0),
            "transparent" => Self::rgba(0, 0, 0, 0.0),
            _ => return None,
        };
        Some(color)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        if s.contains('(') {
            return Self::parse_function(&s);
        }
        Self::named(&s).ok_or(ColorParseError::UnknownName(s))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |v: f32| (v * 255.0).round() as u8;
        write!(
            f,
            "rgba({}, {}, {}, {})",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            self.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!("red".parse::<Color>(), Ok(Color::rgb(255, 0, 0)));
        assert_eq!(" Grey ".parse::<Color>(), Ok(Color::rgb(128, 128, 128)));
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!("#f00".parse::<Color>(), Ok(Color::rgb(255, 0, 0)));
        assert_eq!("#3f51b5".parse::<Color>(), Ok(Color::rgb(0x3f, 0x51, 0xb5)));

        let translucent: Color = "#ff000080".parse().unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_functions() {
        assert_eq!(
            "rgb(120, 120, 120)".parse::<Color>(),
            Ok(Color::rgb(120, 120, 120))
        );
        let c: Color = "rgba(0, 0, 255, 0.5)".parse().unwrap();
        assert_eq!(c.b, 1.0);
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!("".parse::<Color>(), Err(ColorParseError::Empty));
        assert!(matches!(
            "#12345".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(matches!(
            "rgb(1, 2)".parse::<Color>(),
            Err(ColorParseError::InvalidFunction(_))
        ));
        assert!(matches!(
            "blurple".parse::<Color>(),
            Err(ColorParseError::UnknownName(_))
        ));
    }

    #[test]
    fn test_serde_uses_css_strings() {
        let c: Color = serde_json::from_str("\"rgb(255, 0, 0)\"").unwrap();
        assert_eq!(c, Color::rgb(255, 0, 0));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"rgba(255, 0, 0, 1)\"");
    }
}
