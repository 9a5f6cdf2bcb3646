//! Framework-agnostic colours and the legacy BGR colour codes.
//!
//! Script colour codes pack blue in the high byte (`b << 16 | g << 8 | r`),
//! the reverse of the usual RGB hex order. A code of `-1` means "no colour".

use serde::{Deserialize, Serialize};

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a legacy BGR colour code. `-1` and out-of-range codes are
    /// "no colour".
    pub const fn from_code(code: i64) -> Option<Color> {
        if code < 0 || code > 0xFF_FF_FF {
            return None;
        }
        Some(Color {
            r: (code & 0xFF) as u8,
            g: ((code >> 8) & 0xFF) as u8,
            b: ((code >> 16) & 0xFF) as u8,
        })
    }

    /// Encode as a legacy BGR colour code.
    pub const fn to_code(self) -> i64 {
        (self.b as i64) << 16 | (self.g as i64) << 8 | self.r as i64
    }

    /// CSS-style `#rrggbb` name.
    pub fn hex_name(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb` (only; short forms are not part of the legacy API).
    pub fn from_hex_name(name: &str) -> Option<Color> {
        let hex = name.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let value = u32::from_str_radix(hex, 16).ok()?;
        Some(Color {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        })
    }
}

/// Encode an optional colour the way the scripting API reports it:
/// `-1` for "no colour".
pub fn code_of(color: Option<Color>) -> i64 {
    match color {
        Some(color) => color.to_code(),
        None => -1,
    }
}

/// The HTML named colours recognized by `ColourNameToRGB`, lowercase.
///
/// Abbreviated to the names the legacy client documents most heavily; the
/// full X11 table lives host-side for colour pickers.
pub fn named_color(name: &str) -> Option<Color> {
    let name = name.to_ascii_lowercase();
    if let Some(color) = Color::from_hex_name(&name) {
        return Some(color);
    }
    Some(match name.as_str() {
        "black" => Color::new(0, 0, 0),
        "white" => Color::new(255, 255, 255),
        "red" => Color::new(255, 0, 0),
        "green" => Color::new(0, 128, 0),
        "lime" => Color::new(0, 255, 0),
        "blue" => Color::new(0, 0, 255),
        "yellow" => Color::new(255, 255, 0),
        "cyan" | "aqua" => Color::new(0, 255, 255),
        "magenta" | "fuchsia" => Color::new(255, 0, 255),
        "silver" => Color::new(192, 192, 192),
        "gray" | "grey" => Color::new(128, 128, 128),
        "maroon" => Color::new(128, 0, 0),
        "olive" => Color::new(128, 128, 0),
        "navy" => Color::new(0, 0, 128),
        "purple" => Color::new(128, 0, 128),
        "teal" => Color::new(0, 128, 128),
        "orange" => Color::new(255, 165, 0),
        "pink" => Color::new(255, 192, 203),
        "brown" => Color::new(165, 42, 42),
        "gold" => Color::new(255, 215, 0),
        "darkred" => Color::new(139, 0, 0),
        "darkgreen" => Color::new(0, 100, 0),
        "darkblue" => Color::new(0, 0, 139),
        "lightgray" | "lightgrey" => Color::new(211, 211, 211),
        "darkgray" | "darkgrey" => Color::new(169, 169, 169),
        "dimgray" | "dimgrey" => Color::new(105, 105, 105),
        "skyblue" => Color::new(135, 206, 235),
        "khaki" => Color::new(240, 230, 140),
        "tan" => Color::new(210, 180, 140),
        "ivory" => Color::new(255, 255, 240),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgr_round_trip() {
        let color = Color::new(0x12, 0x34, 0x56);
        let code = color.to_code();
        assert_eq!(code, 0x56_34_12);
        assert_eq!(Color::from_code(code), Some(color));
    }

    #[test]
    fn test_negative_code_is_no_color() {
        assert_eq!(Color::from_code(-1), None);
        assert_eq!(code_of(None), -1);
    }

    #[test]
    fn test_hex_name_round_trip() {
        let color = Color::new(255, 165, 0);
        assert_eq!(color.hex_name(), "#ffa500");
        assert_eq!(Color::from_hex_name("#ffa500"), Some(color));
        assert_eq!(Color::from_hex_name("ffa500"), None);
        assert_eq!(Color::from_hex_name("#ffa5"), None);
    }

    #[test]
    fn test_named_colors() {
        assert_eq!(named_color("RED"), Some(Color::new(255, 0, 0)));
        assert_eq!(named_color("#010203"), Some(Color::new(1, 2, 3)));
        assert_eq!(named_color("not-a-color"), None);
    }
}
