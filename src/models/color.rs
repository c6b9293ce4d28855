//! Hex colour values as they appear in analysis output and layouts.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An sRGB colour with 8-bit alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    pub fn parse_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_string(),
            _ => return None,
        };

        let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
        let alpha = if expanded.len() == 8 { channel(6)? } else { 255 };
        Some(Color::rgba(channel(0)?, channel(2)?, channel(4)?, alpha))
    }

    /// Lenient parse: anything unreadable becomes black.
    pub fn parse_or_black(raw: &str) -> Self {
        Self::parse_hex(raw).unwrap_or_else(|| {
            tracing::debug!(color = raw, "Unreadable colour, using black");
            Color::BLACK
        })
    }

    /// Alpha as a 0..1 fraction.
    pub fn alpha(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Opaque `#rrggbb` part, ignoring alpha.
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            self.to_rgb_hex()
        } else {
            format!("{}{:02x}", self.to_rgb_hex(), self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Color::parse_or_black(&raw))
    }
}
