//! "Nice" grid steps and tick labels.

/// Hard cap on the number of ticks one axis may produce.
const MAX_TICKS: usize = 1000;

/// A 1, 2 or 5 times 10^k step giving roughly `target` intervals over `span`.
///
/// Returns `None` for an empty or non-finite span.
#[must_use]
pub fn nice_step(span: f64, target: usize) -> Option<f64> {
    if !span.is_finite() || span <= 0.0 {
        return None;
    }
    let raw = span / target.max(1) as f64;
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let mantissa = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    let step = mantissa * magnitude;
    (step.is_finite() && step > 0.0).then_some(step)
}

/// Subdivision of a major step for the minor grid.
#[must_use]
pub fn minor_step(major: f64) -> f64 {
    major / 5.0
}

/// Every multiple of `step` inside `[min, max]`, ascending.
///
/// Empty when the range would need more than an internal cap of ticks, or
/// when `step` is too fine for neighbouring multiples to be told apart.
#[must_use]
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    let first = (min / step).ceil();
    let last = (max / step).floor();
    if !first.is_finite() || !last.is_finite() || last < first {
        return Vec::new();
    }
    if last - first >= MAX_TICKS as f64 {
        return Vec::new();
    }
    // Past 2^53 consecutive multiples are no longer distinct.
    if first + 1.0 == first || last + 1.0 == last {
        return Vec::new();
    }
    let count = (last - first) as usize;
    // Multiply rather than accumulate so labels stay exact.
    (0..=count).map(|i| (first + i as f64) * step).collect()
}

/// Label for a tick at `value` on an axis with the given step.
///
/// Uses just enough decimals for the step, never prints `-0`, and falls back
/// to scientific notation for very large or very small magnitudes.
#[must_use]
pub fn format_tick(value: f64, step: f64) -> String {
    if value.abs() < step * 1e-6 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e7 || step < 1e-5 {
        return format!("{value:.1e}");
    }
    let decimals = (-step.log10().floor()).max(0.0) as usize;
    format!("{value:.decimals$}")
}
