//! Pixel-resolution sampling of a formula into drawable runs.
//!
//! One pass evaluates the formula across the visible x range and yields
//! [`Polyline`]s lazily. A run ends where the formula is undefined or where
//! consecutive samples straddle a discontinuity, so asymptotes such as those
//! of `1/x` and `tan(x)` are never bridged by a connecting line.
//!
//! A jump of at least a pixel is a *candidate* break when the run has no
//! trend yet, when it reverses the previous step, or when it is more than
//! `jump_factor` times that step. Candidates are then confirmed by bisection:
//! a continuous curve's jump shrinks as the interval halves, a break's does
//! not.

use crate::config::SamplerConfig;
use crate::expression::Expression;
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// Jumps shorter than this on screen never split a run.
const MIN_BREAK_PX: f64 = 1.0;

/// How many samples one pass takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleResolution {
    /// One sample per pixel column boundary: `width + 1` samples.
    #[default]
    Pixel,
    /// A fixed number of evenly spaced samples.
    Fixed(u32),
}

impl SampleResolution {
    /// Fewest samples a fixed resolution may ask for.
    pub const MIN_FIXED: u32 = 10;
    /// Most samples a fixed resolution may ask for.
    pub const MAX_FIXED: u32 = 1000;

    /// Number of samples for a canvas `width` pixels wide.
    #[must_use]
    pub fn sample_count(self, width: u32) -> usize {
        match self {
            Self::Pixel => width as usize + 1,
            Self::Fixed(n) => n.clamp(Self::MIN_FIXED, Self::MAX_FIXED) as usize,
        }
    }
}

/// One evaluated sample; `y` is `None` where the formula is undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    /// Pixel column
    pub px: f64,
    /// Math x
    pub x: f64,
    /// Math y, if defined
    pub y: Option<f64>,
}

impl SamplePoint {
    /// Whether the formula is defined here.
    #[must_use]
    pub const fn defined(&self) -> bool {
        self.y.is_some()
    }
}

/// A defined sample inside a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    /// Pixel column
    pub px: f64,
    /// Math x
    pub x: f64,
    /// Math y
    pub y: f64,
}

/// One continuous run of defined samples, ordered by x.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    points: Vec<PlotPoint>,
}

impl Polyline {
    /// The samples of this run.
    #[must_use]
    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the run has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Evenly spaced sample positions across the viewport.
#[derive(Debug, Clone, Copy)]
struct SampleGrid {
    viewport: Viewport,
    count: usize,
}

impl SampleGrid {
    fn at(&self, index: usize) -> (f64, f64) {
        let width = f64::from(self.viewport.width());
        let px = if self.count <= 1 {
            0.0
        } else {
            index as f64 * width / (self.count - 1) as f64
        };
        (px, self.viewport.to_math(px, 0.0).0)
    }
}

/// Turns a formula and a viewport into polylines.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    config: SamplerConfig,
}

impl Sampler {
    /// Create a sampler.
    #[must_use]
    pub const fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// Current settings.
    #[must_use]
    pub const fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Change how many samples a pass takes.
    pub fn set_resolution(&mut self, resolution: SampleResolution) {
        self.config.resolution = resolution;
    }

    /// Samples one pass will take for this viewport, after the cap.
    #[must_use]
    pub fn sample_count(&self, viewport: &Viewport) -> usize {
        self.config
            .resolution
            .sample_count(viewport.width())
            .min(self.config.max_samples)
    }

    fn grid(&self, viewport: &Viewport) -> SampleGrid {
        SampleGrid {
            viewport: *viewport,
            count: self.sample_count(viewport),
        }
    }

    /// Raw samples of one pass, defined or not.
    pub fn points<'a>(
        &self,
        expr: &'a Expression,
        viewport: &Viewport,
    ) -> impl Iterator<Item = SamplePoint> + 'a {
        let grid = self.grid(viewport);
        (0..grid.count).map(move |i| {
            let (px, x) = grid.at(i);
            SamplePoint {
                px,
                x,
                y: expr.eval(x).ok(),
            }
        })
    }

    /// Sample `expr` across `viewport` into polylines.
    ///
    /// The iterator is lazy and restartable by cloning; call again after
    /// the viewport changes.
    #[must_use]
    pub fn sample<'a>(&self, expr: &'a Expression, viewport: &Viewport) -> Polylines<'a> {
        Polylines {
            expr,
            grid: self.grid(viewport),
            min_jump: MIN_BREAK_PX * viewport.units_per_px_y(),
            jump_factor: self.config.jump_factor,
            refine_depth: self.config.refine_depth,
            next: 0,
            carry: None,
        }
    }
}

/// Lazy iterator over the polylines of one sampling pass.
#[derive(Debug, Clone)]
pub struct Polylines<'a> {
    expr: &'a Expression,
    grid: SampleGrid,
    /// Smallest jump in y units that is visible.
    min_jump: f64,
    jump_factor: f64,
    refine_depth: u32,
    next: usize,
    /// First point of the next run when a discontinuity ended the last one.
    carry: Option<PlotPoint>,
}

impl Polylines<'_> {
    fn is_candidate(&self, run: &[PlotPoint], point: &PlotPoint) -> bool {
        let Some(prev) = run.last() else {
            return false;
        };
        let jump = point.y - prev.y;
        if jump.abs() < self.min_jump {
            return false;
        }
        match run.len().checked_sub(2).map(|i| prev.y - run[i].y) {
            None => true,
            Some(step) => step * jump < 0.0 || jump.abs() > self.jump_factor * step.abs(),
        }
    }

    fn confirm_break(&self, from: &PlotPoint, to: &PlotPoint) -> bool {
        let (mut x0, mut y0) = (from.x, from.y);
        let (mut x1, mut y1) = (to.x, to.y);
        let initial = (y1 - y0).abs();

        // Follow the half with the larger jump. Near a pole that half keeps
        // the pole; on a smooth stretch its jump halves with the interval.
        for _ in 0..self.refine_depth {
            let xm = 0.5 * (x0 + x1);
            let Ok(ym) = self.expr.eval(xm) else {
                return true;
            };
            if (ym - y0).abs() >= (y1 - ym).abs() {
                x1 = xm;
                y1 = ym;
            } else {
                x0 = xm;
                y0 = ym;
            }
        }
        (y1 - y0).abs() > 0.5 * initial
    }
}

impl Iterator for Polylines<'_> {
    type Item = Polyline;

    fn next(&mut self) -> Option<Self::Item> {
        let mut run: Vec<PlotPoint> = self.carry.take().into_iter().collect();

        while self.next < self.grid.count {
            let (px, x) = self.grid.at(self.next);
            self.next += 1;

            let Ok(y) = self.expr.eval(x) else {
                if run.is_empty() {
                    continue;
                }
                return Some(Polyline { points: run });
            };

            let point = PlotPoint { px, x, y };
            if self.is_candidate(&run, &point) {
                if let Some(prev) = run.last() {
                    if self.confirm_break(prev, &point) {
                        self.carry = Some(point);
                        return Some(Polyline { points: run });
                    }
                }
            }
            run.push(point);
        }

        (!run.is_empty()).then_some(Polyline { points: run })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.grid.count - self.next + usize::from(self.carry.is_some());
        (0, Some(remaining))
    }
}

impl FusedIterator for Polylines<'_> {}
