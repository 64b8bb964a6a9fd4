//! Recording canvas and the composed frame it produces.

use crate::draw::{BoxStyle, Canvas, DrawCommand, StrokeStyle, TextStyle};
use crate::{Color, Point, Rect};
use serde::{Deserialize, Serialize};

/// A complete, ready-to-present frame.
///
/// Frames are built entirely in memory and only then handed to a surface,
/// so a failure while composing never leaves a half-drawn canvas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    commands: Vec<DrawCommand>,
}

impl Frame {
    /// The draw commands in paint order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of draw commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the frame draws nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of stroked paths with at least two points.
    #[must_use]
    pub fn path_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Path { points, .. } if points.len() >= 2))
            .count()
    }

    /// All text drawn in this frame, in paint order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// A Canvas implementation that records draw operations as `DrawCommand`s.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    /// Create a new empty recording canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the recorded draw commands.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Get the number of recorded commands.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Finish recording.
    #[must_use]
    pub fn into_frame(self) -> Frame {
        Frame {
            commands: self.commands,
        }
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, color: Color) {
        // Earlier commands are invisible after a clear.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::filled_rect(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands.push(DrawCommand::Rect {
            bounds: rect,
            style: BoxStyle::stroke(StrokeStyle::solid(color, width)),
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, style: StrokeStyle) {
        self.commands.push(DrawCommand::line(from, to, style));
    }

    fn draw_path(&mut self, points: &[Point], style: StrokeStyle) {
        if points.is_empty() {
            return;
        }
        self.commands.push(DrawCommand::Path {
            points: points.to_vec(),
            style,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        self.commands
            .push(DrawCommand::filled_circle(center, radius, color));
    }

    fn draw_text(&mut self, text: &str, position: Point, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            content: text.to_string(),
            position,
            style: style.clone(),
        });
    }
}
