//! The visible math rectangle and its mapping onto canvas pixels.

use crate::config::ViewConfig;
use crate::error::GraphError;
use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// How a canvas resize affects the visible rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeMode {
    /// Keep the math rectangle; the scale follows the canvas.
    #[default]
    KeepRect,
    /// Keep units-per-pixel and the centre; the rectangle grows or shrinks.
    KeepScale,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn is_valid(&self) -> bool {
        [self.x_min, self.x_max, self.y_min, self.y_max]
            .iter()
            .all(|v| v.is_finite())
            && self.x_max > self.x_min
            && self.y_max > self.y_min
    }

    /// Rescale around the centre so units-per-pixel survive a resize.
    fn rescaled(&self, from: (u32, u32), to: (u32, u32)) -> Self {
        let sx = f64::from(to.0) / f64::from(from.0);
        let sy = f64::from(to.1) / f64::from(from.1);
        let cx = (self.x_min + self.x_max) / 2.0;
        let cy = (self.y_min + self.y_max) / 2.0;
        let half_x = (self.x_max - self.x_min) * sx / 2.0;
        let half_y = (self.y_max - self.y_min) * sy / 2.0;
        Self {
            x_min: cx - half_x,
            x_max: cx + half_x,
            y_min: cy - half_y,
            y_max: cy + half_y,
        }
    }
}

/// Visible math rectangle plus its pixel dimensions.
///
/// Invariant: `x_max > x_min`, `y_max > y_min`, all bounds finite and both
/// pixel dimensions non-zero. Pixel y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Bounds,
    initial: Bounds,
    width: u32,
    height: u32,
    min_span: f64,
    max_span: f64,
}

impl Viewport {
    /// Smallest span zoom may reach unless configured otherwise.
    pub const DEFAULT_MIN_SPAN: f64 = 1e-9;
    /// Largest span zoom may reach unless configured otherwise.
    pub const DEFAULT_MAX_SPAN: f64 = 1e12;

    /// Create a viewport showing `[x_min, x_max] x [y_min, y_max]`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidViewport`] if the bounds are empty,
    /// reversed or not finite, or if either pixel dimension is zero.
    pub fn new(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        width: u32,
        height: u32,
    ) -> Result<Self, GraphError> {
        let bounds = Bounds {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        if !bounds.is_valid() {
            return Err(GraphError::InvalidViewport(format!(
                "bounds [{x_min}, {x_max}] x [{y_min}, {y_max}] are empty or not finite"
            )));
        }
        if width == 0 || height == 0 {
            return Err(GraphError::InvalidViewport(format!(
                "pixel size {width}x{height} has a zero dimension"
            )));
        }
        Ok(Self {
            bounds,
            initial: bounds,
            width,
            height,
            min_span: Self::DEFAULT_MIN_SPAN,
            max_span: Self::DEFAULT_MAX_SPAN,
        })
    }

    /// Viewport centred on `(cx, cy)` with equal units-per-pixel on both axes.
    ///
    /// # Errors
    ///
    /// Same as [`Viewport::new`].
    pub fn centered(
        cx: f64,
        cy: f64,
        x_span: f64,
        width: u32,
        height: u32,
    ) -> Result<Self, GraphError> {
        Self::with_aspect(cx, cy, x_span, 1.0, width, height)
    }

    fn with_aspect(
        cx: f64,
        cy: f64,
        x_span: f64,
        aspect: f64,
        width: u32,
        height: u32,
    ) -> Result<Self, GraphError> {
        if width == 0 {
            return Err(GraphError::InvalidViewport(
                "pixel width is zero".to_string(),
            ));
        }
        let y_span = x_span * aspect * f64::from(height) / f64::from(width);
        Self::new(
            cx - x_span / 2.0,
            cx + x_span / 2.0,
            cy - y_span / 2.0,
            cy + y_span / 2.0,
            width,
            height,
        )
    }

    /// Build the initial viewport described by `config` for a canvas of the
    /// given size.
    ///
    /// # Errors
    ///
    /// Same as [`Viewport::new`].
    pub fn from_config(config: &ViewConfig, width: u32, height: u32) -> Result<Self, GraphError> {
        let viewport = match config.data_aspect {
            Some(aspect) => Self::with_aspect(
                config.center_x,
                config.center_y,
                config.x_span,
                aspect,
                width,
                height,
            )?,
            None => Self::new(
                config.center_x - config.x_span / 2.0,
                config.center_x + config.x_span / 2.0,
                config.center_y - config.y_span / 2.0,
                config.center_y + config.y_span / 2.0,
                width,
                height,
            )?,
        };
        Ok(viewport.with_span_limits(config.min_span, config.max_span))
    }

    /// Limit how far zoom may go on either axis.
    #[must_use]
    pub fn with_span_limits(mut self, min_span: f64, max_span: f64) -> Self {
        if min_span > 0.0 && max_span > min_span && max_span.is_finite() {
            self.min_span = min_span;
            self.max_span = max_span;
        }
        self
    }

    /// Left edge in math units.
    #[must_use]
    pub const fn x_min(&self) -> f64 {
        self.bounds.x_min
    }

    /// Right edge in math units.
    #[must_use]
    pub const fn x_max(&self) -> f64 {
        self.bounds.x_max
    }

    /// Bottom edge in math units.
    #[must_use]
    pub const fn y_min(&self) -> f64 {
        self.bounds.y_min
    }

    /// Top edge in math units.
    #[must_use]
    pub const fn y_max(&self) -> f64 {
        self.bounds.y_max
    }

    /// Width of the visible rectangle in math units.
    #[must_use]
    pub fn x_span(&self) -> f64 {
        self.bounds.x_max - self.bounds.x_min
    }

    /// Height of the visible rectangle in math units.
    #[must_use]
    pub fn y_span(&self) -> f64 {
        self.bounds.y_max - self.bounds.y_min
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn pixel_size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    /// Math units covered by one horizontal pixel.
    #[must_use]
    pub fn units_per_px_x(&self) -> f64 {
        self.x_span() / f64::from(self.width)
    }

    /// Math units covered by one vertical pixel.
    #[must_use]
    pub fn units_per_px_y(&self) -> f64 {
        self.y_span() / f64::from(self.height)
    }

    /// Map a math point to pixels.
    #[must_use]
    pub fn to_pixel(&self, mx: f64, my: f64) -> (f64, f64) {
        let px = (mx - self.bounds.x_min) / self.x_span() * f64::from(self.width);
        let py = (self.bounds.y_max - my) / self.y_span() * f64::from(self.height);
        (px, py)
    }

    /// Map a pixel position to math coordinates.
    #[must_use]
    pub fn to_math(&self, px: f64, py: f64) -> (f64, f64) {
        let mx = self.bounds.x_min + px / f64::from(self.width) * self.x_span();
        let my = self.bounds.y_max - py / f64::from(self.height) * self.y_span();
        (mx, my)
    }

    /// Move the content by a pointer delta in pixels.
    ///
    /// Dragging right shows what lies to the left. Returns whether the
    /// rectangle changed.
    pub fn pan(&mut self, dx_px: f64, dy_px: f64) -> bool {
        if !dx_px.is_finite() || !dy_px.is_finite() || (dx_px == 0.0 && dy_px == 0.0) {
            return false;
        }
        let shift_x = -dx_px * self.units_per_px_x();
        let shift_y = dy_px * self.units_per_px_y();
        let moved = Bounds {
            x_min: self.bounds.x_min + shift_x,
            x_max: self.bounds.x_max + shift_x,
            y_min: self.bounds.y_min + shift_y,
            y_max: self.bounds.y_max + shift_y,
        };
        if !moved.is_valid() {
            return false;
        }
        self.bounds = moved;
        true
    }

    /// Zoom around a pixel anchor; `factor > 1` zooms in.
    ///
    /// The math point under `anchor` stays under it. Each axis is clamped to
    /// the span limits on its own. Non-finite or non-positive factors are
    /// ignored. Returns whether the rectangle changed.
    pub fn zoom(&mut self, factor: f64, anchor: (f64, f64)) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let (ax, ay) = self.to_math(anchor.0, anchor.1);
        let (x_min, x_max) = self.zoom_axis(self.bounds.x_min, self.bounds.x_max, ax, factor);
        let (y_min, y_max) = self.zoom_axis(self.bounds.y_min, self.bounds.y_max, ay, factor);
        let zoomed = Bounds {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        if !zoomed.is_valid() || zoomed == self.bounds {
            return false;
        }
        self.bounds = zoomed;
        true
    }

    fn zoom_axis(&self, min: f64, max: f64, anchor: f64, factor: f64) -> (f64, f64) {
        let span = max - min;
        let new_span = (span / factor).clamp(self.min_span, self.max_span);
        // Fraction of the span that lies below the anchor is preserved.
        let t = (anchor - min) / span;
        let new_min = anchor - t * new_span;
        (new_min, new_min + new_span)
    }

    /// Adopt new pixel dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidViewport`] for a zero dimension; the
    /// viewport is left unchanged.
    pub fn resize(&mut self, width: u32, height: u32, mode: ResizeMode) -> Result<(), GraphError> {
        if width == 0 || height == 0 {
            return Err(GraphError::InvalidViewport(format!(
                "pixel size {width}x{height} has a zero dimension"
            )));
        }
        if mode == ResizeMode::KeepScale {
            let from = (self.width, self.height);
            self.bounds = self.bounds.rescaled(from, (width, height));
            self.initial = self.initial.rescaled(from, (width, height));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Restore the rectangle the viewport was created with.
    ///
    /// Returns whether the rectangle changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.bounds != self.initial;
        self.bounds = self.initial;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewport() -> Viewport {
        Viewport::new(-10.0, 10.0, -5.0, 5.0, 400, 200).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert!(Viewport::new(1.0, 1.0, 0.0, 1.0, 10, 10).is_err());
        assert!(Viewport::new(0.0, 1.0, 2.0, 1.0, 10, 10).is_err());
        assert!(Viewport::new(0.0, f64::INFINITY, 0.0, 1.0, 10, 10).is_err());
        assert!(Viewport::new(0.0, 1.0, 0.0, 1.0, 0, 10).is_err());
        assert!(matches!(
            Viewport::new(f64::NAN, 1.0, 0.0, 1.0, 10, 10),
            Err(GraphError::InvalidViewport(_))
        ));
    }

    #[test]
    fn test_to_pixel_corners() {
        let vp = viewport();
        assert_eq!(vp.to_pixel(-10.0, 5.0), (0.0, 0.0));
        assert_eq!(vp.to_pixel(10.0, -5.0), (400.0, 200.0));
        assert_eq!(vp.to_pixel(0.0, 0.0), (200.0, 100.0));
    }

    #[test]
    fn test_centered_is_square() {
        let vp = Viewport::centered(0.0, 0.0, 20.0, 400, 200).unwrap();
        assert_eq!(vp.y_span(), 10.0);
        assert!((vp.units_per_px_x() - vp.units_per_px_y()).abs() < 1e-12);
    }

    #[test]
    fn test_pan_direction() {
        let mut vp = viewport();
        // Drag right by 20 px = 1 math unit.
        assert!(vp.pan(20.0, 0.0));
        assert!((vp.x_min() + 11.0).abs() < 1e-12);
        assert!((vp.x_max() - 9.0).abs() < 1e-12);

        // Drag down by 20 px = 1 math unit; rectangle moves up.
        assert!(vp.pan(0.0, 20.0));
        assert!((vp.y_max() - 6.0).abs() < 1e-12);
        assert!(!vp.pan(0.0, 0.0));
        assert!(!vp.pan(f64::NAN, 1.0));
    }

    #[test]
    fn test_zoom_in_halves_span() {
        let mut vp = viewport();
        assert!(vp.zoom(2.0, (200.0, 100.0)));
        assert!((vp.x_span() - 10.0).abs() < 1e-12);
        assert!((vp.y_span() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_zoom_ignores_bad_factor() {
        let mut vp = viewport();
        assert!(!vp.zoom(0.0, (0.0, 0.0)));
        assert!(!vp.zoom(-2.0, (0.0, 0.0)));
        assert!(!vp.zoom(f64::NAN, (0.0, 0.0)));
        assert_eq!(vp, viewport());
    }

    #[test]
    fn test_zoom_clamps_spans() {
        let mut vp = viewport().with_span_limits(1.0, 100.0);
        vp.zoom(1e6, (100.0, 50.0));
        assert!((vp.x_span() - 1.0).abs() < 1e-9);
        assert!((vp.y_span() - 1.0).abs() < 1e-9);
        vp.zoom(1e-6, (100.0, 50.0));
        assert!((vp.x_span() - 100.0).abs() < 1e-9);
        assert!((vp.y_span() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_modes() {
        let mut vp = viewport();
        vp.resize(800, 400, ResizeMode::KeepRect).unwrap();
        assert_eq!(vp.x_span(), 20.0);
        assert_eq!(vp.width(), 800);

        let mut vp = viewport();
        vp.resize(800, 200, ResizeMode::KeepScale).unwrap();
        assert_eq!(vp.x_span(), 40.0);
        assert_eq!(vp.y_span(), 10.0);
        assert_eq!((vp.x_min() + vp.x_max()) / 2.0, 0.0);

        assert!(vp.resize(0, 100, ResizeMode::KeepRect).is_err());
        assert_eq!(vp.width(), 800);
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut vp = viewport();
        vp.pan(13.0, -7.0);
        vp.zoom(3.0, (10.0, 10.0));
        assert!(vp.reset());
        assert_eq!(vp.x_min(), -10.0);
        assert_eq!(vp.y_max(), 5.0);
        assert!(!vp.reset());
    }

    #[test]
    fn test_from_config_fits_aspect() {
        let config = ViewConfig::default();
        let vp = Viewport::from_config(&config, 600, 300).unwrap();
        assert_eq!(vp.x_span(), config.x_span);
        assert!((vp.y_span() - config.x_span / 2.0).abs() < 1e-12);
        assert_eq!(vp.pixel_size().aspect_ratio(), 2.0);
    }

    proptest! {
        #[test]
        fn prop_pixel_math_round_trip(
            px in 0.0f64..800.0,
            py in 0.0f64..600.0,
            x_min in -1e3f64..1e3,
            x_span in 1e-3f64..1e3,
        ) {
            let vp = Viewport::new(x_min, x_min + x_span, -x_span, x_span, 800, 600).unwrap();
            let (mx, my) = vp.to_math(px, py);
            let (qx, qy) = vp.to_pixel(mx, my);
            prop_assert!((qx - px).abs() < 1e-6);
            prop_assert!((qy - py).abs() < 1e-6);
        }

        #[test]
        fn prop_zoom_keeps_anchor(
            factor in 0.05f64..20.0,
            ax in 0.0f64..400.0,
            ay in 0.0f64..200.0,
        ) {
            let mut vp = viewport();
            let before = vp.to_math(ax, ay);
            vp.zoom(factor, (ax, ay));
            let after = vp.to_math(ax, ay);
            prop_assert!((before.0 - after.0).abs() < 1e-9);
            prop_assert!((before.1 - after.1).abs() < 1e-9);
        }
    }
}
