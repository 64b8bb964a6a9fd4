//! Draw commands and the canvas abstraction.
//!
//! Every frame reduces to these primitives. Surfaces replay them; tests
//! inspect them.

use crate::{Color, Point, Rect};
use serde::{Deserialize, Serialize};

/// Stroke style for path rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Stroke color
    pub color: Color,
    /// Stroke width in pixels
    pub width: f32,
    /// Line join style
    pub join: LineJoin,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
            join: LineJoin::Miter,
        }
    }
}

impl StrokeStyle {
    /// Solid stroke of the given color and width.
    #[must_use]
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    /// Use rounded joins (curves look smoother at steep turns).
    #[must_use]
    pub const fn round_join(mut self) -> Self {
        self.join = LineJoin::Round;
        self
    }
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    /// Sharp corner
    #[default]
    Miter,
    /// Rounded corner
    Round,
    /// Beveled corner
    Bevel,
}

impl LineJoin {
    /// Name accepted by the canvas `lineJoin` property.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Miter => "miter",
            Self::Round => "round",
            Self::Bevel => "bevel",
        }
    }
}

/// Fill and stroke for rectangles and circles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStyle {
    /// Fill color (None = no fill)
    pub fill: Option<Color>,
    /// Stroke style (None = no stroke)
    pub stroke: Option<StrokeStyle>,
}

impl BoxStyle {
    /// Create a box with only fill color.
    #[must_use]
    pub const fn fill(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }

    /// Create a box with only stroke.
    #[must_use]
    pub const fn stroke(style: StrokeStyle) -> Self {
        Self {
            fill: None,
            stroke: Some(style),
        }
    }
}

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    /// Position is the left edge
    #[default]
    Left,
    /// Position is the center
    Center,
    /// Position is the right edge
    Right,
}

impl TextAlign {
    /// Name accepted by the canvas `textAlign` property.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Text style for labels, legend and error banner.
///
/// The text position is the top of the line box at the aligned edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in pixels
    pub size: f32,
    /// Text color
    pub color: Color,
    /// Horizontal alignment
    pub align: TextAlign,
    /// Monospace instead of sans-serif
    pub monospace: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            color: Color::WHITE,
            align: TextAlign::Left,
            monospace: false,
        }
    }
}

impl TextStyle {
    /// CSS font shorthand for the canvas `font` property.
    #[must_use]
    pub fn css_font(&self) -> String {
        let family = if self.monospace {
            "monospace"
        } else {
            "sans-serif"
        };
        format!("{}px {family}", self.size)
    }
}

/// Drawing primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    /// Fill the whole surface, discarding what was there.
    Clear {
        /// Background color
        color: Color,
    },

    /// Stroke an open polyline
    Path {
        /// Points along the path
        points: Vec<Point>,
        /// Stroke style
        style: StrokeStyle,
    },

    /// Draw a rectangle
    Rect {
        /// Rectangle bounds
        bounds: Rect,
        /// Box style
        style: BoxStyle,
    },

    /// Draw a circle
    Circle {
        /// Center point
        center: Point,
        /// Radius
        radius: f32,
        /// Box style
        style: BoxStyle,
    },

    /// Draw text
    Text {
        /// Text content
        content: String,
        /// Position
        position: Point,
        /// Text style
        style: TextStyle,
    },
}

impl DrawCommand {
    /// Create a filled rectangle.
    #[must_use]
    pub const fn filled_rect(bounds: Rect, color: Color) -> Self {
        Self::Rect {
            bounds,
            style: BoxStyle::fill(color),
        }
    }

    /// Create a filled circle.
    #[must_use]
    pub const fn filled_circle(center: Point, radius: f32, color: Color) -> Self {
        Self::Circle {
            center,
            radius,
            style: BoxStyle::fill(color),
        }
    }

    /// Create a line between two points.
    #[must_use]
    pub fn line(from: Point, to: Point, style: StrokeStyle) -> Self {
        Self::Path {
            points: vec![from, to],
            style,
        }
    }
}

/// Anything the renderer can paint onto.
pub trait Canvas {
    /// Discard everything and fill with `color`.
    fn clear(&mut self, color: Color);

    /// Draw a filled rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a stroked rectangle.
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);

    /// Draw a line between two points.
    fn draw_line(&mut self, from: Point, to: Point, style: StrokeStyle);

    /// Draw an open polyline.
    fn draw_path(&mut self, points: &[Point], style: StrokeStyle);

    /// Draw a filled circle.
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    /// Draw text.
    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle);
}
