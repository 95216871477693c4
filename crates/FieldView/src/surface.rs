//! # Surface Protocol
//!
//! The drawing surface is owned by the host. The library only talks to it through
//! [`Surface`], a stateful canvas-2D style API: the surface keeps the current transform,
//! the paint state and the path under construction.
//!
//! Transforms follow canvas semantics: `translate`, `scale` and `rotate` post-multiply
//! the current matrix, so they apply to coordinates *before* any earlier transform.

use glam::DAffine2;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SurfaceError;

/// Dimensions of the drawing target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    /// Width in device pixels.
    pub width: f64,
    /// Height in device pixels.
    pub height: f64,
    /// Device pixels per logical (CSS) pixel.
    pub device_pixel_ratio: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio: 1.0,
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Size in logical pixels.
    pub fn logical(&self) -> (f64, f64) {
        (
            self.width / self.device_pixel_ratio,
            self.height / self.device_pixel_ratio,
        )
    }
}

/// How the ends of stroked open paths are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// A canvas-like drawing target.
pub trait Surface {
    /// Handle to a decoded image the surface can draw.
    type Image;

    /// Clears everything and resets transform and paint state for a target of `size`.
    fn reset(&mut self, size: SurfaceSize);

    /// Pushes transform and paint state.
    fn save(&mut self);

    /// Pops transform and paint state. Unbalanced calls are ignored.
    fn restore(&mut self);

    /// Reads back the current transform.
    ///
    /// Surfaces that cannot introspect their transform return
    /// [`SurfaceError::TransformUnavailable`].
    fn transform(&self) -> Result<DAffine2, SurfaceError>;

    /// Replaces the current transform.
    fn set_transform(&mut self, transform: DAffine2);

    fn translate(&mut self, x: f64, y: f64);

    fn scale(&mut self, x: f64, y: f64);

    /// Rotates the coordinate system by `angle` radians.
    fn rotate(&mut self, angle: f64);

    fn set_global_alpha(&mut self, alpha: f64);

    fn set_fill_color(&mut self, color: Color);

    fn set_stroke_color(&mut self, color: Color);

    /// Line width in current user units.
    fn set_line_width(&mut self, width: f64);

    fn set_line_cap(&mut self, cap: LineCap);

    /// CSS font shorthand, e.g. `"12px sans-serif"`.
    fn set_font(&mut self, font: &str);

    /// Starts a new, empty path.
    fn begin_path(&mut self);

    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    /// Adds a clockwise arc around `(x, y)` to the path.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);

    fn close_path(&mut self);

    /// Fills the current path with the fill color.
    fn fill(&mut self);

    /// Strokes the current path with the stroke color and line width.
    fn stroke(&mut self);

    fn fill_text(&mut self, text: &str, x: f64, y: f64);

    fn stroke_text(&mut self, text: &str, x: f64, y: f64);

    /// Draws `image` scaled into the given rectangle.
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64);
}
