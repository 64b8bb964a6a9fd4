//! Colors and sizes used when composing a frame.

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// Visual settings for the plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Canvas background
    pub background: Color,
    /// Minor grid lines
    pub grid_minor: Color,
    /// Major grid lines
    pub grid_major: Color,
    /// The x and y axes
    pub axis: Color,
    /// Tick labels and legend text
    pub label: Color,
    /// Error banner text
    pub error: Color,
    /// Curve stroke width in pixels
    pub curve_width: f32,
    /// Label font size in pixels
    pub font_size: f32,
    /// Approximate number of major grid intervals across the larger axis
    pub target_grid_lines: usize,
    /// Draw the minor grid
    pub show_minor_grid: bool,
    /// Draw the legend
    pub show_legend: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark background, light lines.
    #[must_use]
    pub fn dark() -> Self {
        let background = Color::from_rgb8(27, 27, 27);
        let grid_major = Color::from_rgb8(80, 80, 80);
        Self {
            background,
            grid_minor: grid_major.lerp(&background, 0.6),
            grid_major,
            axis: Color::from_rgb8(200, 200, 200),
            label: Color::from_rgb8(170, 170, 170),
            error: Color::new(0.94, 0.47, 0.47, 1.0), // Light red
            curve_width: 2.0,
            font_size: 12.0,
            target_grid_lines: 10,
            show_minor_grid: true,
            show_legend: true,
        }
    }

    /// Light background, dark lines.
    #[must_use]
    pub fn light() -> Self {
        let background = Color::from_rgb8(248, 248, 248);
        let grid_major = Color::from_rgb8(200, 200, 200);
        Self {
            background,
            grid_minor: grid_major.lerp(&background, 0.6),
            grid_major,
            axis: Color::from_rgb8(40, 40, 40),
            label: Color::from_rgb8(80, 80, 80),
            error: Color::new(0.69, 0.18, 0.18, 1.0), // Red
            ..Self::dark()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dark() {
        assert_eq!(Theme::default(), Theme::dark());
        assert_ne!(Theme::light().background, Theme::dark().background);
    }

    #[test]
    fn test_minor_grid_is_fainter_than_major() {
        let theme = Theme::dark();
        assert!(theme.grid_minor.r < theme.grid_major.r);
        assert!(theme.grid_minor.r > theme.background.r);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let theme: Theme = serde_json::from_str(r#"{"curve_width": 3.5}"#).unwrap();
        assert_eq!(theme.curve_width, 3.5);
        assert_eq!(theme.font_size, Theme::dark().font_size);
    }
}
