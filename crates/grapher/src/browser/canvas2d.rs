//! Canvas2D surface - replays frames onto an HTML5 canvas.
//!
//! Frames are drawn into a detached buffer canvas first and copied onto the
//! visible canvas in a single `drawImage`, so a command that fails halfway
//! leaves the previous frame on screen.

use grapher_core::draw::{BoxStyle, DrawCommand, StrokeStyle, TextStyle};
use grapher_core::{Frame, Point, Rect, RenderError, StartupError, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, StartupError> {
    canvas
        .get_context("2d")
        .map_err(|e| StartupError::ContextUnavailable(format!("{e:?}")))?
        .ok_or_else(|| StartupError::ContextUnavailable("no 2d context available".to_string()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| StartupError::ContextUnavailable("not a CanvasRenderingContext2d".to_string()))
}

/// Drawing surface backed by a canvas 2d context.
#[derive(Debug, Clone)]
pub struct Canvas2DSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Off-document canvas every frame is composed on.
    buffer: HtmlCanvasElement,
    buffer_ctx: CanvasRenderingContext2d,
}

impl Canvas2DSurface {
    /// Acquire the 2d context of `canvas` and a buffer canvas beside it.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, StartupError> {
        let ctx = context_2d(&canvas)?;
        // The copy replaces the previous frame instead of blending over it.
        ctx.set_global_composite_operation("copy")
            .map_err(|e| StartupError::ContextUnavailable(format!("{e:?}")))?;

        let document = canvas.owner_document().ok_or_else(|| {
            StartupError::ContextUnavailable("canvas has no owner document".to_string())
        })?;
        let buffer = document
            .create_element("canvas")
            .map_err(|e| StartupError::ContextUnavailable(format!("{e:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| StartupError::ContextUnavailable("buffer is not a canvas".to_string()))?;
        let buffer_ctx = context_2d(&buffer)?;

        Ok(Self {
            canvas,
            ctx,
            buffer,
            buffer_ctx,
        })
    }

    /// The canvas element.
    pub const fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the displayed size.
    ///
    /// Returns the new size, or `None` if the canvas is not laid out.
    pub fn fit_to_client(&self) -> Option<(u32, u32)> {
        fit_to_client(&self.canvas)
    }

    /// Give the buffer the visible canvas's size.
    fn match_buffer(&self) -> (u32, u32) {
        let (width, height) = (self.canvas.width(), self.canvas.height());
        if self.buffer.width() != width {
            self.buffer.set_width(width);
        }
        if self.buffer.height() != height {
            self.buffer.set_height(height);
        }
        (width, height)
    }

    fn render_command(&self, cmd: &DrawCommand) -> Result<(), JsValue> {
        match cmd {
            DrawCommand::Clear { color } => {
                self.buffer_ctx.set_fill_style_str(&color.to_css());
                self.buffer_ctx.fill_rect(
                    0.0,
                    0.0,
                    f64::from(self.buffer.width()),
                    f64::from(self.buffer.height()),
                );
                Ok(())
            }
            DrawCommand::Path { points, style } => {
                self.draw_path(points, style);
                Ok(())
            }
            DrawCommand::Rect { bounds, style } => {
                self.draw_rect(bounds, style);
                Ok(())
            }
            DrawCommand::Circle {
                center,
                radius,
                style,
            } => self.draw_circle(*center, *radius, style),
            DrawCommand::Text {
                content,
                position,
                style,
            } => self.draw_text(content, *position, style),
        }
    }

    fn apply_box_style(&self, style: &BoxStyle) {
        if let Some(fill) = style.fill {
            self.buffer_ctx.set_fill_style_str(&fill.to_css());
            self.buffer_ctx.fill();
        }
        if let Some(stroke) = &style.stroke {
            self.buffer_ctx.set_stroke_style_str(&stroke.color.to_css());
            self.buffer_ctx.set_line_width(f64::from(stroke.width));
            self.buffer_ctx.stroke();
        }
    }

    fn draw_rect(&self, bounds: &Rect, style: &BoxStyle) {
        self.buffer_ctx.begin_path();
        self.buffer_ctx.rect(
            f64::from(bounds.x),
            f64::from(bounds.y),
            f64::from(bounds.width),
            f64::from(bounds.height),
        );
        self.apply_box_style(style);
    }

    fn draw_circle(&self, center: Point, radius: f32, style: &BoxStyle) -> Result<(), JsValue> {
        self.buffer_ctx.begin_path();
        self.buffer_ctx.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius),
            0.0,
            std::f64::consts::TAU,
        )?;
        self.apply_box_style(style);
        Ok(())
    }

    fn draw_path(&self, points: &[Point], style: &StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        self.buffer_ctx.begin_path();
        self.buffer_ctx.move_to(f64::from(first.x), f64::from(first.y));
        for p in rest {
            self.buffer_ctx.line_to(f64::from(p.x), f64::from(p.y));
        }
        self.buffer_ctx.set_line_join(style.join.as_css());
        self.buffer_ctx.set_stroke_style_str(&style.color.to_css());
        self.buffer_ctx.set_line_width(f64::from(style.width));
        self.buffer_ctx.stroke();
    }

    fn draw_text(&self, content: &str, position: Point, style: &TextStyle) -> Result<(), JsValue> {
        self.buffer_ctx.set_font(&style.css_font());
        self.buffer_ctx.set_text_align(style.align.as_css());
        self.buffer_ctx.set_text_baseline("top");
        self.buffer_ctx.set_fill_style_str(&style.color.to_css());
        self.buffer_ctx
            .fill_text(content, f64::from(position.x), f64::from(position.y))
    }
}

impl Surface for Canvas2DSurface {
    fn size(&self) -> Result<(u32, u32), RenderError> {
        if !self.canvas.is_connected() {
            return Err(RenderError::SurfaceUnavailable(
                "canvas removed from the document".to_string(),
            ));
        }
        Ok((self.canvas.width(), self.canvas.height()))
    }

    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        let (width, height) = self.match_buffer();
        if width == 0 || height == 0 {
            return Err(RenderError::SurfaceUnavailable("canvas has no area".to_string()));
        }
        for cmd in frame.commands() {
            self.render_command(cmd)
                .map_err(|e| RenderError::DrawFailed(format!("{e:?}")))?;
        }
        self.ctx
            .draw_image_with_html_canvas_element(&self.buffer, 0.0, 0.0)
            .map_err(|e| RenderError::DrawFailed(format!("{e:?}")))
    }
}

/// Resize the canvas backing store to its CSS size.
///
/// Returns the resulting size, or `None` if the canvas has no layout box.
pub fn fit_to_client(canvas: &HtmlCanvasElement) -> Option<(u32, u32)> {
    let width = u32::try_from(canvas.client_width()).ok().filter(|w| *w > 0)?;
    let height = u32::try_from(canvas.client_height()).ok().filter(|h| *h > 0)?;
    if canvas.width() != width {
        canvas.set_width(width);
    }
    if canvas.height() != height {
        canvas.set_height(height);
    }
    Some((width, height))
}
