//! Frame composition and presentation.
//!
//! [`compose_frame`] is pure: it turns a viewport, a theme and sampled curves
//! into a [`Frame`]. [`Renderer`] owns the surface and commits a frame only
//! once it is complete.

use crate::canvas::{Frame, RecordingCanvas};
use crate::color::Color;
use crate::draw::{Canvas, StrokeStyle, TextAlign, TextStyle};
use crate::error::RenderError;
use crate::geometry::{Point, Rect};
use crate::host::Surface;
use crate::sampler::Polyline;
use crate::theme::Theme;
use crate::ticks;
use crate::viewport::Viewport;

/// Pixel coordinates are clamped to this many canvas sizes beyond each edge.
const PIXEL_BAND: f64 = 1.0;

/// Gap between labels and the lines they annotate.
const LABEL_PAD: f32 = 3.0;

/// The curves of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Formula text for the legend; empty hides the legend entry
    pub label: String,
    /// Stroke color
    pub color: Color,
    /// Sampled runs
    pub polylines: Vec<Polyline>,
}

/// Things drawn above the plot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    /// Message for the error banner
    pub error: Option<String>,
}

/// Compose a complete frame.
#[must_use]
pub fn compose_frame(
    viewport: &Viewport,
    theme: &Theme,
    layers: &[Layer],
    overlay: &Overlay,
) -> Frame {
    let mut canvas = RecordingCanvas::new();
    let bounds = Rect::from_size(viewport.pixel_size());

    canvas.clear(theme.background);
    paint_grid(&mut canvas, viewport, theme, bounds);
    let origin = paint_axes(&mut canvas, viewport, theme, bounds);
    paint_labels(&mut canvas, viewport, theme, bounds, origin);

    for layer in layers {
        paint_layer(&mut canvas, viewport, theme, bounds, layer);
    }
    if theme.show_legend {
        paint_legend(&mut canvas, theme, bounds, layers);
    }
    if let Some(message) = &overlay.error {
        paint_error(&mut canvas, theme, bounds, message);
    }

    canvas.into_frame()
}

/// Major grid step per axis, sized so the larger axis gets roughly
/// `target_grid_lines` intervals.
fn major_steps(viewport: &Viewport, theme: &Theme) -> (Option<f64>, Option<f64>) {
    let size = viewport.pixel_size();
    let longest = size.width.max(size.height);
    let target = |extent: f32| {
        ((theme.target_grid_lines as f32 * extent / longest).round() as usize).max(2)
    };
    (
        ticks::nice_step(viewport.x_span(), target(size.width)),
        ticks::nice_step(viewport.y_span(), target(size.height)),
    )
}

fn clamp_px(value: f64, extent: f32) -> f32 {
    let extent = f64::from(extent);
    value.clamp(-extent * PIXEL_BAND, extent * (1.0 + PIXEL_BAND)) as f32
}

fn to_screen(viewport: &Viewport, bounds: Rect, x: f64, y: f64) -> Point {
    let (px, py) = viewport.to_pixel(x, y);
    Point::new(clamp_px(px, bounds.width), clamp_px(py, bounds.height))
}

fn paint_gridlines(
    canvas: &mut RecordingCanvas,
    viewport: &Viewport,
    bounds: Rect,
    steps: (f64, f64),
    color: Color,
) {
    let style = StrokeStyle::solid(color, 1.0);
    for x in ticks::ticks(viewport.x_min(), viewport.x_max(), steps.0) {
        let px = to_screen(viewport, bounds, x, 0.0).x;
        canvas.draw_line(
            Point::new(px, bounds.y),
            Point::new(px, bounds.bottom()),
            style.clone(),
        );
    }
    for y in ticks::ticks(viewport.y_min(), viewport.y_max(), steps.1) {
        let py = to_screen(viewport, bounds, 0.0, y).y;
        canvas.draw_line(
            Point::new(bounds.x, py),
            Point::new(bounds.right(), py),
            style.clone(),
        );
    }
}

fn paint_grid(canvas: &mut RecordingCanvas, viewport: &Viewport, theme: &Theme, bounds: Rect) {
    let (Some(step_x), Some(step_y)) = major_steps(viewport, theme) else {
        return;
    };
    if theme.show_minor_grid {
        let minor = (ticks::minor_step(step_x), ticks::minor_step(step_y));
        paint_gridlines(canvas, viewport, bounds, minor, theme.grid_minor);
    }
    paint_gridlines(canvas, viewport, bounds, (step_x, step_y), theme.grid_major);
}

/// Draw both axes, pinned to the nearest edge when off-screen.
///
/// Returns the pixel position where the axes cross.
fn paint_axes(
    canvas: &mut RecordingCanvas,
    viewport: &Viewport,
    theme: &Theme,
    bounds: Rect,
) -> Point {
    let (px, py) = viewport.to_pixel(0.0, 0.0);
    let origin = Point::new(
        (px as f32).clamp(bounds.x, bounds.right()),
        (py as f32).clamp(bounds.y, bounds.bottom()),
    );
    let style = StrokeStyle::solid(theme.axis, 1.5);
    canvas.draw_line(
        Point::new(bounds.x, origin.y),
        Point::new(bounds.right(), origin.y),
        style.clone(),
    );
    canvas.draw_line(
        Point::new(origin.x, bounds.y),
        Point::new(origin.x, bounds.bottom()),
        style,
    );
    origin
}

fn paint_labels(
    canvas: &mut RecordingCanvas,
    viewport: &Viewport,
    theme: &Theme,
    bounds: Rect,
    origin: Point,
) {
    let (Some(step_x), Some(step_y)) = major_steps(viewport, theme) else {
        return;
    };
    let font = theme.font_size;
    let style = TextStyle {
        size: font,
        color: theme.label,
        ..TextStyle::default()
    };

    // Below the x axis, or above it when the axis hugs the bottom edge.
    let label_y = if origin.y + LABEL_PAD + font > bounds.bottom() {
        origin.y - LABEL_PAD - font
    } else {
        origin.y + LABEL_PAD
    };
    for x in ticks::ticks(viewport.x_min(), viewport.x_max(), step_x) {
        if x.abs() < step_x * 1e-6 {
            continue;
        }
        let px = to_screen(viewport, bounds, x, 0.0).x;
        canvas.draw_text(
            &ticks::format_tick(x, step_x),
            Point::new(px + LABEL_PAD, label_y),
            &style,
        );
    }

    // Right of the y axis, or left of it when the axis hugs the right edge.
    let near_right = origin.x + 6.0 * font > bounds.right();
    let y_style = TextStyle {
        align: if near_right {
            TextAlign::Right
        } else {
            TextAlign::Left
        },
        ..style.clone()
    };
    let label_x = if near_right {
        origin.x - LABEL_PAD
    } else {
        origin.x + LABEL_PAD
    };
    for y in ticks::ticks(viewport.y_min(), viewport.y_max(), step_y) {
        if y.abs() < step_y * 1e-6 {
            continue;
        }
        let py = to_screen(viewport, bounds, 0.0, y).y;
        canvas.draw_text(
            &ticks::format_tick(y, step_y),
            Point::new(label_x, py + LABEL_PAD),
            &y_style,
        );
    }

    let (px, py) = viewport.to_pixel(0.0, 0.0);
    if bounds.contains_point(&Point::new(px as f32, py as f32)) {
        canvas.draw_text("0", Point::new(origin.x + LABEL_PAD, label_y), &style);
    }
}

fn paint_layer(
    canvas: &mut RecordingCanvas,
    viewport: &Viewport,
    theme: &Theme,
    bounds: Rect,
    layer: &Layer,
) {
    let style = StrokeStyle::solid(layer.color, theme.curve_width).round_join();
    for polyline in &layer.polylines {
        let points: Vec<Point> = polyline
            .points()
            .iter()
            .map(|p| to_screen(viewport, bounds, p.x, p.y))
            .collect();
        match points.as_slice() {
            [] => {}
            [single] => {
                if bounds.contains_point(single) {
                    canvas.fill_circle(*single, theme.curve_width, layer.color);
                }
            }
            _ => canvas.draw_path(&points, style.clone()),
        }
    }
}

fn paint_legend(canvas: &mut RecordingCanvas, theme: &Theme, bounds: Rect, layers: &[Layer]) {
    let line_height = theme.font_size + 4.0;
    let entries = layers.iter().filter(|layer| !layer.label.trim().is_empty());
    for (row, layer) in entries.enumerate() {
        let style = TextStyle {
            size: theme.font_size,
            color: layer.color,
            align: TextAlign::Right,
            monospace: true,
        };
        canvas.draw_text(
            &format!("y = {}", layer.label.trim()),
            Point::new(bounds.right() - 8.0, bounds.y + 8.0 + row as f32 * line_height),
            &style,
        );
    }
}

fn paint_error(canvas: &mut RecordingCanvas, theme: &Theme, bounds: Rect, message: &str) {
    let height = theme.font_size + 12.0;
    let strip = Rect::new(bounds.x, bounds.bottom() - height, bounds.width, height);
    canvas.fill_rect(strip, theme.background.with_alpha(0.85));
    let style = TextStyle {
        size: theme.font_size,
        color: theme.error,
        align: TextAlign::Left,
        monospace: true,
    };
    canvas.draw_text(message, Point::new(strip.x + 8.0, strip.y + 6.0), &style);
}

/// Owns the drawing surface and commits composed frames to it.
#[derive(Debug)]
pub struct Renderer<S> {
    surface: S,
    theme: Theme,
}

impl<S: Surface> Renderer<S> {
    /// Create a renderer drawing onto `surface`.
    pub const fn new(surface: S, theme: Theme) -> Self {
        Self { surface, theme }
    }

    /// The surface this renderer draws onto.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Current theme.
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Replace the theme for subsequent frames.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Compose a full frame and commit it to the surface.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the surface is unusable or rejects the
    /// frame; the previous frame stays visible in that case.
    pub fn render(
        &mut self,
        viewport: &Viewport,
        layers: &[Layer],
        overlay: &Overlay,
    ) -> Result<(), RenderError> {
        let (width, height) = self.surface.size()?;
        if width == 0 || height == 0 {
            return Err(RenderError::EmptySurface);
        }
        let frame = compose_frame(viewport, &self.theme, layers, overlay);
        self.surface.present(&frame)
    }
}
