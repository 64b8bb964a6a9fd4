//! Color representation and the curve palette.

use serde::{Deserialize, Serialize};

/// RGBA color with values in the range [0.0, 1.0].
///
/// Deserializes from either `{"r": .., "g": .., "b": .., "a": ..}` or a hex
/// string such as `"#1b1b1b"`, so themes can be written by hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Color {
    /// Red component [0.0, 1.0]
    pub r: f32,
    /// Green component [0.0, 1.0]
    pub g: f32,
    /// Blue component [0.0, 1.0]
    pub b: f32,
    /// Alpha component [0.0, 1.0]
    pub a: f32,
}

/// Curve colors, one per function slot.
const PALETTE_RGB: [[u8; 3]; 18] = [
    [255, 0, 0],     // red
    [0, 255, 0],     // green
    [255, 255, 0],   // yellow
    [0, 0, 255],     // blue
    [165, 42, 42],   // brown
    [255, 215, 0],   // gold
    [160, 160, 160], // gray
    [255, 255, 255], // white
    [255, 255, 224], // light yellow
    [144, 238, 144], // light green
    [173, 216, 230], // light blue
    [220, 220, 220], // light gray
    [255, 128, 128], // light red
    [96, 96, 96],    // dark gray
    [139, 0, 0],     // dark red
    [240, 230, 140], // khaki
    [0, 100, 0],     // dark green
    [0, 0, 139],     // dark blue
];

impl Color {
    /// Create a new color, clamping values to [0.0, 1.0].
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    /// Create an opaque color from RGB values.
    #[must_use]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create an opaque color from 8-bit channels.
    #[must_use]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Parse a hex color string (e.g., "#ff0000" or "ff0000").
    ///
    /// Supports 6-character RGB and 8-character RGBA formats.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid hex color.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(ColorParseError::InvalidHex);
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorParseError::InvalidHex)
        };

        match hex.len() {
            6 => Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Ok(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?)
                .with_alpha(f32::from(channel(6..8)?) / 255.0)),
            _ => Err(ColorParseError::InvalidLength),
        }
    }

    /// Same color with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// CSS `rgba()` string for canvas fill and stroke styles.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "rgba({},{},{},{})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }

    /// Linear interpolation between two colors.
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Palette color for a function slot; wraps past the end.
    #[must_use]
    pub fn palette(index: usize) -> Self {
        let [r, g, b] = PALETTE_RGB[index % PALETTE_RGB.len()];
        Self::from_rgb8(r, g, b)
    }

    /// Number of distinct palette entries.
    pub const PALETTE_LEN: usize = PALETTE_RGB.len();

    // Common colors
    /// Black color
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    /// White color
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    /// Transparent color
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Accepted serialized forms of [`Color`].
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Rgba {
        r: f32,
        g: f32,
        b: f32,
        #[serde(default = "opaque")]
        a: f32,
    },
}

const fn opaque() -> f32 {
    1.0
}

impl TryFrom<ColorRepr> for Color {
    type Error = ColorParseError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Hex(hex) => Self::from_hex(&hex),
            ColorRepr::Rgba { r, g, b, a } => Ok(Self::new(r, g, b, a)),
        }
    }
}

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    /// Invalid hex characters
    #[error("invalid hex characters")]
    InvalidHex,
    /// Invalid string length
    #[error("invalid hex string length (expected 6 or 8)")]
    InvalidLength,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_color_new_clamps_values() {
        let c = Color::new(1.5, -0.5, 0.5, 2.0);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert_eq!(c.b, 0.5);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex("#ff0000").unwrap();
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));

        let c = Color::from_hex("00ff0080").unwrap();
        assert_eq!(c.g, 1.0);
        assert!((c.a - 0.502).abs() < 0.01);
    }

    #[test]
    fn test_color_from_hex_invalid() {
        assert_eq!(Color::from_hex("#gg0000"), Err(ColorParseError::InvalidHex));
        assert_eq!(Color::from_hex("#ff"), Err(ColorParseError::InvalidLength));
        assert_eq!(Color::from_hex("ééé"), Err(ColorParseError::InvalidHex));
    }

    #[test]
    fn test_color_deserializes_from_hex_or_channels() {
        let c: Color = serde_json::from_str(r##""#1b1b1b""##).unwrap();
        assert_eq!(c, Color::from_rgb8(27, 27, 27));

        let c: Color = serde_json::from_str(r#"{"r": 1.0, "g": 0.5, "b": 0.0}"#).unwrap();
        assert_eq!(c, Color::new(1.0, 0.5, 0.0, 1.0));

        let json = serde_json::to_string(&Color::WHITE.with_alpha(0.25)).unwrap();
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::WHITE.with_alpha(0.25));

        let err = serde_json::from_str::<Color>(r##""#12""##).unwrap_err();
        assert!(err.to_string().contains("expected 6 or 8"));
    }

    #[test]
    fn test_color_to_css() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_css(), "rgba(255,0,0,1)");
        assert_eq!(Color::WHITE.with_alpha(0.5).to_css(), "rgba(255,255,255,0.5)");
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(Color::palette(0), Color::from_rgb8(255, 0, 0));
        assert_eq!(Color::palette(Color::PALETTE_LEN), Color::palette(0));
        assert_ne!(Color::palette(0), Color::palette(1));
    }

    #[test]
    fn test_color_parse_error_display() {
        assert_eq!(
            ColorParseError::InvalidLength.to_string(),
            "invalid hex string length (expected 6 or 8)"
        );
    }

    proptest! {
        #[test]
        fn prop_hex_matches_channels(r in 0u8..=255, g in 0u8..=255, b in 0u8..=255) {
            let hex = format!("#{r:02x}{g:02x}{b:02x}");
            prop_assert_eq!(Color::from_hex(&hex).unwrap(), Color::from_rgb8(r, g, b));
        }

        #[test]
        fn prop_lerp_endpoints(r in 0.0f32..1.0, g in 0.0f32..1.0, b in 0.0f32..1.0) {
            let c1 = Color::rgb(r, g, b);
            let c2 = Color::rgb(1.0 - r, 1.0 - g, 1.0 - b);
            let start = c1.lerp(&c2, 0.0);
            prop_assert!((start.r - c1.r).abs() < 0.001);
            let end = c1.lerp(&c2, 1.0);
            prop_assert!((end.b - c2.b).abs() < 0.001);
        }
    }
}
