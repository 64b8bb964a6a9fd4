//! Core engine for the grapher.
//!
//! This crate contains everything the grapher needs that does not touch the
//! browser:
//! - Formula parsing and evaluation: [`Expression`], [`parse`]
//! - Math/pixel mapping with pan and zoom: [`Viewport`]
//! - Pixel-resolution sampling into drawable runs: [`Sampler`], [`Polyline`]
//! - Frame composition and presentation: [`Renderer`], [`Frame`]
//! - Input handling and redraw coalescing: [`Controller`], [`RedrawScheduler`]
//! - The host seam and the session that ties it together: [`Host`], [`Session`]
//!
//! # Example
//!
//! ```
//! use grapher_core::{parse, Sampler, SamplerConfig, Viewport};
//!
//! let expr = parse("1/x").expect("valid formula");
//! let viewport = Viewport::new(-1.0, 1.0, -5.0, 5.0, 200, 100).expect("valid viewport");
//! let sampler = Sampler::new(SamplerConfig::default());
//!
//! // The pole at x = 0 splits the curve in two.
//! assert!(sampler.sample(&expr, &viewport).count() >= 2);
//! ```

mod canvas;
mod color;
pub mod config;
pub mod draw;
mod error;
mod event;
pub mod expression;
mod functions;
mod geometry;
pub mod host;
mod interaction;
mod render;
pub mod sampler;
mod session;
pub mod share;
mod theme;
pub mod ticks;
mod viewport;

pub use canvas::{Frame, RecordingCanvas};
pub use color::{Color, ColorParseError};
pub use config::{GrapherConfig, InteractionConfig, SamplerConfig, ViewConfig};
pub use draw::{Canvas, DrawCommand, StrokeStyle, TextAlign, TextStyle};
pub use error::{
    ConfigError, DomainError, GraphError, ParseError, ParseErrorKind, RenderError, StartupError,
};
pub use event::{InputEvent, Key, MouseButton};
pub use expression::{evaluate, parse, Expression};
pub use functions::{FunctionEntry, FunctionSet};
pub use geometry::{Point, Rect, Size};
pub use host::{
    CallbackId, EventHandler, EventSource, HandlerResponse, Host, HostEvent, MemoryHost,
    MemorySurface, Surface, SurfaceMonitor,
};
pub use interaction::{Controller, RedrawScheduler};
pub use render::{compose_frame, Layer, Overlay, Renderer};
pub use sampler::{PlotPoint, Polyline, Polylines, SamplePoint, SampleResolution, Sampler};
pub use session::{Session, SessionHandle, SessionStats};
pub use theme::Theme;
pub use viewport::{ResizeMode, Viewport};
