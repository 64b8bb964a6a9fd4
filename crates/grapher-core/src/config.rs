//! Grapher configuration.
//!
//! Every field has a default, so a host page only spells out what it wants
//! to change:
//!
//! ```
//! use grapher_core::GrapherConfig;
//!
//! let config = GrapherConfig::from_json(r#"{"initial_functions": ["sin(x)", "cos(x)"]}"#)
//!     .expect("valid config");
//! assert_eq!(config.initial_functions.len(), 2);
//! assert_eq!(config.max_functions, 18);
//! ```

use crate::color::Color;
use crate::error::ConfigError;
use crate::sampler::SampleResolution;
use crate::theme::Theme;
use crate::viewport::{ResizeMode, Viewport};
use serde::{Deserialize, Serialize};

/// Top-level configuration for one grapher session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrapherConfig {
    /// Initial view and zoom limits
    pub view: ViewConfig,
    /// Sampling behaviour
    pub sampler: SamplerConfig,
    /// Pointer, wheel and key handling
    pub interaction: InteractionConfig,
    /// Colors and sizes
    pub theme: Theme,
    /// Formulas shown when the URL carries none
    pub initial_functions: Vec<String>,
    /// Upper bound on simultaneous formulas
    pub max_functions: usize,
    /// Mirror the formula list into the URL fragment
    pub sync_url: bool,
}

impl Default for GrapherConfig {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            sampler: SamplerConfig::default(),
            interaction: InteractionConfig::default(),
            theme: Theme::default(),
            initial_functions: vec!["x^2".to_string()],
            max_functions: Color::PALETTE_LEN,
            sync_url: true,
        }
    }
}

impl GrapherConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is unusable.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value for usability.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.view.validate()?;
        self.sampler.validate()?;
        self.interaction.validate()?;
        positive("theme.curve_width", f64::from(self.theme.curve_width))?;
        positive("theme.font_size", f64::from(self.theme.font_size))?;
        if self.theme.target_grid_lines == 0 {
            return Err(invalid("theme.target_grid_lines", "must be at least 1"));
        }
        if self.max_functions == 0 {
            return Err(invalid("max_functions", "must be at least 1"));
        }
        if self.initial_functions.len() > self.max_functions {
            return Err(invalid(
                "initial_functions",
                format!(
                    "{} formulas exceed max_functions ({})",
                    self.initial_functions.len(),
                    self.max_functions
                ),
            ));
        }
        Ok(())
    }
}

/// Initial view rectangle and zoom limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Math x at the canvas centre
    pub center_x: f64,
    /// Math y at the canvas centre
    pub center_y: f64,
    /// Visible width in math units
    pub x_span: f64,
    /// Ratio of x to y units on screen; `None` uses `y_span` as given
    pub data_aspect: Option<f64>,
    /// Visible height in math units when `data_aspect` is `None`
    pub y_span: f64,
    /// Smallest span zoom may reach
    pub min_span: f64,
    /// Largest span zoom may reach
    pub max_span: f64,
    /// Behaviour on canvas resize
    pub resize: ResizeMode,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            x_span: 20.0,
            data_aspect: Some(1.0),
            y_span: 20.0,
            min_span: Viewport::DEFAULT_MIN_SPAN,
            max_span: Viewport::DEFAULT_MAX_SPAN,
            resize: ResizeMode::default(),
        }
    }
}

impl ViewConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        finite("view.center_x", self.center_x)?;
        finite("view.center_y", self.center_y)?;
        positive("view.x_span", self.x_span)?;
        match self.data_aspect {
            Some(aspect) => positive("view.data_aspect", aspect)?,
            None => positive("view.y_span", self.y_span)?,
        }
        positive("view.min_span", self.min_span)?;
        positive("view.max_span", self.max_span)?;
        if self.max_span <= self.min_span {
            return Err(invalid("view.max_span", "must exceed min_span"));
        }
        Ok(())
    }
}

/// Sampling behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Samples per pass
    pub resolution: SampleResolution,
    /// How much steeper than the previous step a jump must be to split
    pub jump_factor: f64,
    /// Bisection steps spent confirming a suspected discontinuity
    pub refine_depth: u32,
    /// Hard cap on samples in one pass
    pub max_samples: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            resolution: SampleResolution::Pixel,
            jump_factor: 8.0,
            refine_depth: 10,
            max_samples: 16_384,
        }
    }
}

impl SamplerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("sampler.jump_factor", self.jump_factor)?;
        if self.jump_factor <= 1.0 {
            return Err(invalid("sampler.jump_factor", "must be greater than 1"));
        }
        if self.max_samples < 2 {
            return Err(invalid("sampler.max_samples", "must be at least 2"));
        }
        if self.refine_depth > 64 {
            return Err(invalid("sampler.refine_depth", "must be at most 64"));
        }
        Ok(())
    }
}

/// Pointer, wheel and key handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Zoom per wheel pixel: `factor = exp(-delta_y * wheel_sensitivity)`
    pub wheel_sensitivity: f64,
    /// Arrow-key pan distance in pixels
    pub key_pan_px: f64,
    /// Zoom factor for one `+` or `-` key press
    pub key_zoom_factor: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            wheel_sensitivity: 0.0015,
            key_pan_px: 40.0,
            key_zoom_factor: 1.25,
        }
    }
}

impl InteractionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("interaction.wheel_sensitivity", self.wheel_sensitivity)?;
        positive("interaction.key_pan_px", self.key_pan_px)?;
        positive("interaction.key_zoom_factor", self.key_zoom_factor)?;
        if self.key_zoom_factor <= 1.0 {
            return Err(invalid(
                "interaction.key_zoom_factor",
                "must be greater than 1",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        message: message.into(),
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not finite")))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is not positive")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GrapherConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_functions, vec!["x^2".to_string()]);
        assert_eq!(config.max_functions, 18);
        assert!(config.sync_url);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config = GrapherConfig::from_json(r#"{"view": {"x_span": 8.0}}"#).unwrap();
        assert_eq!(config.view.x_span, 8.0);
        assert_eq!(config.view.data_aspect, Some(1.0));
        assert_eq!(config.sampler, SamplerConfig::default());

        let config = GrapherConfig::from_json("{}").unwrap();
        assert_eq!(config, GrapherConfig::default());
    }

    #[test]
    fn test_resolution_json() {
        let config =
            GrapherConfig::from_json(r#"{"sampler": {"resolution": {"fixed": 500}}}"#).unwrap();
        assert_eq!(config.sampler.resolution, SampleResolution::Fixed(500));
        let config = GrapherConfig::from_json(r#"{"view": {"resize": "keep_scale"}}"#).unwrap();
        assert_eq!(config.view.resize, ResizeMode::KeepScale);
    }

    #[test]
    fn test_theme_colors_from_hex() {
        let json = r##"{"theme": {"background": "#ffffff", "axis": "#00000080"}}"##;
        let config = GrapherConfig::from_json(json).unwrap();
        assert_eq!(config.theme.background, Color::WHITE);
        assert_eq!(config.theme.axis, Color::from_rgb8(0, 0, 0).with_alpha(128.0 / 255.0));
        assert_eq!(config.theme.label, Theme::dark().label);

        let err = GrapherConfig::from_json(r##"{"theme": {"axis": "#zz0000"}}"##).unwrap_err();
        assert!(err.to_string().contains("invalid hex characters"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GrapherConfig::from_json(r#"{"view": {"x_span": -1}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "view.x_span",
                ..
            }
        ));

        let err = GrapherConfig::from_json(r#"{"sampler": {"jump_factor": 1.0}}"#).unwrap_err();
        assert!(err.to_string().contains("sampler.jump_factor"));

        let json = r#"{"max_functions": 1, "initial_functions": ["x", "2x"]}"#;
        let err = GrapherConfig::from_json(json).unwrap_err();
        assert!(err.to_string().contains("initial_functions"));

        let err =
            GrapherConfig::from_json(r#"{"view": {"min_span": 10, "max_span": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("view.max_span"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = GrapherConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
