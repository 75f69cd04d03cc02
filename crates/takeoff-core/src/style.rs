//! Style intent
//!
//! The calculation engine does not render anything; it only tags rows with
//! what they should look like so the rendering surface can reproduce it.

use std::fmt;

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(0xC0, 0x00, 0x00);
    pub const BLUE: Color = Color::rgb(0x1F, 0x4E, 0x79);
    pub const SECTION_FILL: Color = Color::rgb(0xD9, 0xE1, 0xF2);
    pub const SUM_FILL: Color = Color::rgb(0xFF, 0xF2, 0xCC);

    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Create from a hex string (e.g., "#FF0000" or "FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Color::rgb(r, g, b))
    }

    /// Convert to a hex string (e.g., "#C00000")
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// How a row should look, independent of any rendering engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleIntent {
    pub bold: bool,
    pub italic: bool,
    pub strikethrough: bool,
    pub font_color: Option<Color>,
    pub fill: Option<Color>,
}

impl StyleIntent {
    /// Create a plain style
    pub const fn new() -> Self {
        StyleIntent {
            bold: false,
            italic: false,
            strikethrough: false,
            font_color: None,
            fill: None,
        }
    }

    /// Set bold
    pub const fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set italic
    pub const fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set strikethrough
    pub const fn strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = strikethrough;
        self
    }

    /// Set font color
    pub const fn font_color(mut self, color: Color) -> Self {
        self.font_color = Some(color);
        self
    }

    /// Set background fill
    pub const fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Check if this is the plain style
    pub fn is_plain(&self) -> bool {
        *self == StyleIntent::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip() {
        assert_eq!(Color::from_hex("#C00000"), Some(Color::RED));
        assert_eq!(Color::RED.to_hex(), "#C00000");
        assert_eq!(Color::from_hex("12345"), None);
        assert_eq!(Color::from_hex("GG0000"), None);
    }

    #[test]
    fn test_builder() {
        let style = StyleIntent::new().bold(true).fill(Color::SUM_FILL);
        assert!(style.bold);
        assert!(!style.is_plain());
        assert!(StyleIntent::default().is_plain());
    }
}
