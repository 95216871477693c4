//! # Configuration
//!
//! This module defines the construction options for a [`crate::FieldRenderer`].

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ConfigError;

/// Options for a [`crate::FieldRenderer`].
///
/// Missing keys take their defaults and unknown keys are ignored, so a host can pass
/// through a larger options object unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldOptions {
    /// Space kept free around the field, in logical pixels. Default: 15.0.
    pub padding: f64,
    /// Opacity of the field art. Default: 0.25.
    pub alpha: f64,
    /// Side length of the field in inches. Default: 144.0.
    pub field_size: f64,
    /// Line segments per spline. Default: 250.
    pub spline_samples: NonZeroUsize,
    /// Grid line width in device pixels. Default: 1.0.
    pub grid_line_width: f64,
    /// Default: `rgb(120, 120, 120)`.
    pub grid_line_color: Color,
    /// URL of the base field image, requested once at construction.
    pub field_image: String,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            padding: 15.0,
            alpha: 0.25,
            field_size: 144.0,
            spline_samples: NonZeroUsize::new(250).unwrap_or(NonZeroUsize::MIN),
            grid_line_width: 1.0,
            grid_line_color: Color::rgb(120, 120, 120),
            field_image: "field.png".to_string(),
        }
    }
}

impl FieldOptions {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = FieldOptions::default();
        assert_eq!(opts.padding, 15.0);
        assert_eq!(opts.alpha, 0.25);
        assert_eq!(opts.field_size, 144.0);
        assert_eq!(opts.spline_samples.get(), 250);
        assert_eq!(opts.grid_line_width, 1.0);
        assert_eq!(opts.grid_line_color, Color::rgb(120, 120, 120));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts =
            FieldOptions::from_json(r##"{"padding": 4, "gridLineColor": "#ff0000", "theme": "dark"}"##)
                .unwrap();
        assert_eq!(opts.padding, 4.0);
        assert_eq!(opts.grid_line_color, Color::rgb(255, 0, 0));
        assert_eq!(opts.alpha, 0.25);
        assert_eq!(opts.field_size, 144.0);
    }

    #[test]
    fn test_zero_spline_samples_rejected() {
        assert!(FieldOptions::from_json(r#"{"splineSamples": 0}"#).is_err());
        let opts = FieldOptions::from_json(r#"{"splineSamples": 16}"#).unwrap();
        assert_eq!(opts.spline_samples.get(), 16);
    }

    #[test]
    fn test_bad_color_rejected() {
        assert!(FieldOptions::from_json(r#"{"gridLineColor": "not-a-color"}"#).is_err());
    }
}
