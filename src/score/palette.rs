use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

pub const NEUTRAL: Color = Color::rgb(0x66, 0x66, 0x66);

/// Blue, green, amber, red, purple, pink, cyan, lime.
pub const TRACK_COLORS: [Color; 8] = [
    Color::rgb(0x3B, 0x82, 0xF6),
    Color::rgb(0x10, 0xB9, 0x81),
    Color::rgb(0xF5, 0x9E, 0x0B),
    Color::rgb(0xEF, 0x44, 0x44),
    Color::rgb(0x8B, 0x5C, 0xF6),
    Color::rgb(0xEC, 0x48, 0x99),
    Color::rgb(0x06, 0xB6, 0xD4),
    Color::rgb(0x84, 0xCC, 0x16),
];

pub fn track_color(index: usize) -> Color {
    TRACK_COLORS[index % TRACK_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(track_color(0), track_color(8));
        assert_eq!(track_color(3).to_hex(), "#EF4444");
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#10B981"), Some(TRACK_COLORS[1]));
        assert_eq!(Color::from_hex("84cc16"), Some(TRACK_COLORS[7]));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }
}
