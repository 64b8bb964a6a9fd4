//! Input events delivered to the interaction controller.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Input event types.
///
/// Positions are in canvas pixels relative to the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer button pressed
    PointerDown {
        /// Position of press
        position: Point,
        /// Button pressed
        button: MouseButton,
    },
    /// Pointer moved to position
    PointerMove {
        /// New position
        position: Point,
    },
    /// Pointer button released
    PointerUp {
        /// Position of release
        position: Point,
        /// Button released
        button: MouseButton,
    },
    /// Pointer left the canvas
    PointerLeave,
    /// Wheel scrolled over the canvas
    Wheel {
        /// Pointer position
        position: Point,
        /// Vertical delta in pixels, positive scrolls down
        delta_y: f32,
    },
    /// Canvas resized
    Resize {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// Key pressed
    KeyDown {
        /// Key pressed
        key: Key,
    },
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Left button
    Left,
    /// Middle button
    Middle,
    /// Right button
    Right,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` index.
    #[must_use]
    pub const fn from_dom_index(index: i16) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }
}

/// Keys the grapher reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Pan left
    Left,
    /// Pan right
    Right,
    /// Pan up
    Up,
    /// Pan down
    Down,
    /// `+` or `=`
    ZoomIn,
    /// `-`
    ZoomOut,
    /// `0` or Home
    Reset,
    /// Anything else
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key_str(key: &str) -> Self {
        match key {
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "+" | "=" => Self::ZoomIn,
            "-" | "_" => Self::ZoomOut,
            "0" | "Home" => Self::Reset,
            _ => Self::Other,
        }
    }
}
