//! RGBA color type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{StyleError, TrifillError};

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create a new color with explicit RGBA components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns this color with its alpha channel set from a `[0, 1]` opacity.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    /// Default polygon fill.
    pub const DARK_GRAY: Color = Color::rgb(0x33, 0x33, 0x33);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = TrifillError;

    /// Parses `#rrggbb`, `#rrggbbaa`, or a basic color name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| StyleError::InvalidColor(s.to_owned()).into());
        }
        named_color(s).ok_or_else(|| StyleError::InvalidColor(s.to_owned()).into())
    }
}

impl Color {
    /// Parses a paint specification where `"none"` means no paint at all.
    ///
    /// # Errors
    ///
    /// Returns `StyleError::InvalidColor` if `s` is neither `"none"` nor a
    /// color accepted by [`Color::from_str`].
    pub fn parse_paint(s: &str) -> Result<Option<Self>, TrifillError> {
        if s.trim().eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Color::new(channel(0)?, channel(2)?, channel(4)?, a))
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name.to_lowercase().as_str() {
        "black" => Color::BLACK,
        "white" => Color::WHITE,
        "red" => Color::RED,
        "green" => Color::GREEN,
        "blue" => Color::BLUE,
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    };
    Some(color)
}
