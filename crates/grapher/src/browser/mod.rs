//! Browser runtime for the grapher.
//!
//! This module provides the bridge between the engine's [`Host`] seam and
//! the DOM: Canvas2D drawing, event listeners, animation frames and the
//! share-link fragment.
//!
//! [`Host`]: grapher_core::Host

// WASM-only modules
#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod canvas2d;
#[cfg(target_arch = "wasm32")]
pub mod events;
#[cfg(target_arch = "wasm32")]
pub mod host;
#[cfg(target_arch = "wasm32")]
mod location;

// Cross-platform modules
pub mod dom;
pub mod registry;

#[cfg(target_arch = "wasm32")]
pub use app::{
    add_function, init, remove_function, reset_view, set_function, set_visible, start_web,
    start_web_with_config, stop_web,
};
#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2DSurface;
#[cfg(target_arch = "wasm32")]
pub use host::WebHost;
pub use dom::{DomBinding, ListenTarget};
pub use registry::SessionRegistry;
