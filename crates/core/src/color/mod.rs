use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Result, WaveLineError};

/// Straight-alpha RGBA8 color.
///
/// Serialised as `#RRGGBB` (opaque) or `#AARRGGBB` so configuration files read
/// the same way the host toolkit spells colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::from_rgb(255, 255, 255);
    pub const BLACK: Color = Color::from_rgb(0, 0, 0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpacks a `0xAARRGGBB` value.
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Packs into `0xAARRGGBB`, the layout stored in the shared controls.
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Same color with its alpha replaced.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// WCAG 2.x relative luminance of the opaque color.
    pub fn relative_luminance(self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        0.2126 * channel(self.r) + 0.7152 * channel(self.g) + 0.0722 * channel(self.b)
    }

    /// WCAG contrast ratio in `[1, 21]`.
    pub fn contrast_ratio(self, other: Color) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (light, dark) = if a >= b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }

    /// Picks the first candidate that stays readable on `background`, falling
    /// back to the first candidate when none reaches `min_ratio`.
    pub fn pick_contrasting(
        candidates: &[Color],
        background: Color,
        min_ratio: f64,
    ) -> Option<Color> {
        candidates
            .iter()
            .copied()
            .find(|c| c.contrast_ratio(background) >= min_ratio)
            .or_else(|| candidates.first().copied())
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:08X}", self.to_argb())
        }
    }
}

impl FromStr for Color {
    type Err = WaveLineError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || WaveLineError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
        match hex.len() {
            6 => Ok(Color::from_argb(0xFF00_0000 | value)),
            8 => Ok(Color::from_argb(value)),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = WaveLineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

impl From<Color> for tiny_skia::Color {
    fn from(value: Color) -> Self {
        tiny_skia::Color::from_rgba8(value.r, value.g, value.b, value.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_argb_strings() {
        let green: Color = "#2ED184".parse().unwrap();
        assert_eq!(green, Color::from_rgb(0x2E, 0xD1, 0x84));

        let clear: Color = "#00000000".parse().unwrap();
        assert!(clear.is_transparent());
        assert_eq!(clear, Color::TRANSPARENT);
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in ["2ED184", "#12345", "#GG0000", "#+12345"] {
            let err = bad.parse::<Color>().unwrap_err();
            assert!(format!("{err}").contains(bad));
        }
    }

    #[test]
    fn argb_packing_is_lossless() {
        let color = Color::from_rgba(1, 2, 3, 4);
        assert_eq!(color.to_argb(), 0x0401_0203);
        assert_eq!(Color::from_argb(color.to_argb()), color);
    }

    #[test]
    fn serialises_as_hex_string() {
        let json = serde_json::to_string(&Color::from_rgb(0x2E, 0xD1, 0x84)).unwrap();
        assert_eq!(json, "\"#2ED184\"");

        let back: Color = serde_json::from_str("\"#802ED184\"").unwrap();
        assert_eq!(back.a, 0x80);
    }

    #[test]
    fn contrast_ratio_spans_wcag_range() {
        let ratio = Color::BLACK.contrast_ratio(Color::WHITE);
        assert!((ratio - 21.0).abs() < 1e-6);
        assert!((Color::WHITE.contrast_ratio(Color::WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn picks_first_readable_candidate() {
        let pale = Color::from_rgb(250, 250, 250);
        let dark = Color::from_rgb(20, 20, 20);
        let picked = Color::pick_contrasting(&[pale, dark], Color::WHITE, 2.5);
        assert_eq!(picked, Some(dark));

        let fallback = Color::pick_contrasting(&[pale], Color::WHITE, 2.5);
        assert_eq!(fallback, Some(pale));
        assert_eq!(Color::pick_contrasting(&[], Color::WHITE, 2.5), None);
    }
}
