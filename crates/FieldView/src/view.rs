//! # Field Transform System
//!
//! This module handles the mapping from **Field Space** (inches, origin at the field
//! center, compass-style axes) to **Surface Space** (logical pixels of the drawing target).
//!
//! Two layers are involved:
//! - the *base transform*, fixed for a render pass and derived from the field rectangle;
//! - the *alt transform*, an origin offset plus rotation that overlay operations layer on
//!   top of the base.

use std::f64::consts::FRAC_PI_2;

use glam::{DAffine2, DVec2};

use crate::error::SurfaceError;
use crate::surface::Surface;

/// The square area of the surface the field is drawn into, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FieldRect {
    /// The largest square that fits in `width` x `height` after `padding` on every side,
    /// centered in the surface.
    pub fn centered_square(width: f64, height: f64, padding: f64) -> Self {
        let side = width.min(height) - 2.0 * padding;
        Self {
            x: (width - side) / 2.0,
            y: (height - side) / 2.0,
            width: side,
            height: side,
        }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Holds the base transform of the current render pass and rebuilds the alt transform
/// from it on demand.
#[derive(Clone, Copy, Debug)]
pub struct TransformContext {
    base: DAffine2,
}

impl Default for TransformContext {
    fn default() -> Self {
        Self {
            base: DAffine2::IDENTITY,
        }
    }
}

impl TransformContext {
    /// Field-to-surface transform for `rect`, applied on top of `parent`.
    ///
    /// Centers the origin in the rectangle, flips Y, scales inches to surface units and
    /// turns the axes a quarter turn so +X points toward the far wall.
    pub fn compute_base_transform(parent: DAffine2, rect: &FieldRect, field_size: f64) -> DAffine2 {
        parent
            * DAffine2::from_translation(rect.center())
            * DAffine2::from_scale(DVec2::new(
                rect.width / field_size,
                -rect.height / field_size,
            ))
            * DAffine2::from_angle(FRAC_PI_2)
    }

    /// Applies the base transform for `rect` to `surface` and remembers it.
    pub fn establish<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        rect: &FieldRect,
        field_size: f64,
    ) -> Result<DAffine2, SurfaceError> {
        let base = Self::compute_base_transform(surface.transform()?, rect, field_size);
        surface.set_transform(base);
        self.base = base;
        Ok(base)
    }

    pub fn base(&self) -> DAffine2 {
        self.base
    }

    /// The alt transform: base, then translate by `origin`, then rotate by `rotation`.
    pub fn baseline(&self, origin: DVec2, rotation: f64) -> DAffine2 {
        self.base * DAffine2::from_translation(origin) * DAffine2::from_angle(rotation)
    }

    /// Resets the surface to the alt transform.
    ///
    /// Always starts from the base transform: whatever was active before, including a
    /// scale applied by an earlier operation, is discarded.
    pub fn reset_to_baseline<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        origin: DVec2,
        rotation: f64,
    ) {
        surface.set_transform(self.baseline(origin, rotation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    fn approx(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_centered_square() {
        let rect = FieldRect::centered_square(800.0, 600.0, 15.0);
        assert_eq!(rect.width, 570.0);
        assert_eq!(rect.height, 570.0);
        assert_eq!(rect.x, 115.0);
        assert_eq!(rect.y, 15.0);
        assert_eq!(rect.center(), DVec2::new(400.0, 300.0));
    }

    #[test]
    fn test_base_transform_axes() {
        let rect = FieldRect {
            x: 0.0,
            y: 0.0,
            width: 144.0,
            height: 144.0,
        };
        let base = TransformContext::compute_base_transform(DAffine2::IDENTITY, &rect, 144.0);

        // Field origin sits at the rectangle center.
        assert!(approx(base.transform_point2(DVec2::ZERO), DVec2::new(72.0, 72.0)));
        // +X in field space points up the screen.
        assert!(approx(
            base.transform_point2(DVec2::new(10.0, 0.0)),
            DVec2::new(72.0, 62.0)
        ));
        // +Y in field space points left.
        assert!(approx(
            base.transform_point2(DVec2::new(0.0, 10.0)),
            DVec2::new(62.0, 72.0)
        ));
    }

    #[test]
    fn test_baseline_layers_origin_then_rotation() {
        let ctx = TransformContext::default();
        let t = ctx.baseline(DVec2::new(5.0, 5.0), FRAC_PI_2);
        assert!(approx(t.transform_point2(DVec2::new(1.0, 0.0)), DVec2::new(5.0, 6.0)));
    }

    #[test]
    fn test_establish_applies_base_on_top_of_surface() {
        let mut surface = RecordingSurface::<()>::new();
        surface.scale(2.0, 2.0);
        let rect = FieldRect::centered_square(200.0, 100.0, 0.0);

        let mut ctx = TransformContext::default();
        let base = ctx.establish(&mut surface, &rect, 144.0).unwrap();
        let expected = TransformContext::compute_base_transform(
            DAffine2::from_scale(DVec2::splat(2.0)),
            &rect,
            144.0,
        );
        assert_eq!(base, expected);
        assert_eq!(surface.transform(), Ok(expected));

        // A stray scale is wiped by the reset.
        surface.scale(3.0, 3.0);
        ctx.reset_to_baseline(&mut surface, DVec2::new(5.0, 5.0), 0.25);
        assert_eq!(surface.transform(), Ok(ctx.baseline(DVec2::new(5.0, 5.0), 0.25)));
    }

    #[test]
    fn test_establish_needs_transform() {
        let mut surface = RecordingSurface::<()>::without_transform_introspection();
        let rect = FieldRect::centered_square(100.0, 100.0, 0.0);
        let err = TransformContext::default().establish(&mut surface, &rect, 144.0);
        assert_eq!(err, Err(SurfaceError::TransformUnavailable));
    }
}
