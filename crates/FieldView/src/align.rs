//! # Pixel Alignment
//!
//! A 1px line drawn on an integer device coordinate straddles two pixels and comes out
//! 2px wide and blurry. Snapping the coordinate to the nearest pixel center keeps thin
//! strokes crisp.

use glam::{DAffine2, DVec2};

use crate::error::SurfaceError;
use crate::surface::Surface;

/// Snaps `x` to the nearest half-pixel boundary for a device scaling factor `scaling`.
///
/// Coordinates that already land exactly on a pixel boundary are returned unchanged.
pub fn align_coord(x: f64, scaling: f64) -> f64 {
    let device = x * scaling;
    let rounded = device.round();
    (rounded + 0.5 * sign(device - rounded)) / scaling
}

// `f64::signum` maps zero to one, which would push exact coordinates off their boundary.
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Device pixels per user unit along each axis of `transform`.
///
/// Tracks rotation and non-uniform scale: each component is the length of the row of
/// the linear part that produces that device coordinate.
pub fn scaling_factors(transform: &DAffine2) -> DVec2 {
    let m = transform.matrix2;
    DVec2::new(
        m.x_axis.x.hypot(m.y_axis.x),
        m.x_axis.y.hypot(m.y_axis.y),
    )
}

/// Straight-line path building with pixel-aligned endpoints.
///
/// Wraps a surface for the duration of a path. Every call re-reads the surface
/// transform, so alignment stays correct when the transform changes mid-path.
pub struct PixelAligner<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> PixelAligner<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        Self { surface }
    }

    /// Aligns a user-space point against the surface's current transform.
    pub fn align(&self, x: f64, y: f64) -> Result<DVec2, SurfaceError> {
        let scaling = scaling_factors(&self.surface.transform()?);
        Ok(DVec2::new(
            align_coord(x, scaling.x),
            align_coord(y, scaling.y),
        ))
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> Result<(), SurfaceError> {
        let p = self.align(x, y)?;
        self.surface.move_to(p.x, p.y);
        Ok(())
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> Result<(), SurfaceError> {
        let p = self.align(x, y)?;
        self.surface.line_to(p.x, p.y);
        Ok(())
    }

    /// Aligned open path through `points`. Does nothing for an empty slice.
    pub fn polyline(&mut self, points: &[DVec2]) -> Result<(), SurfaceError> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        self.move_to(first.x, first.y)?;
        for p in rest {
            self.line_to(p.x, p.y)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const SCALES: [f64; 5] = [1.0, 1.5, 2.0, 3.0, 0.75];
    const COORDS: [f64; 9] = [0.0, 0.3, 10.0, 10.1, 10.25, -3.7, -20.5, 57.123, 1e4 + 0.49];

    #[test]
    fn test_snaps_to_half_pixel() {
        assert_eq!(align_coord(10.2, 1.0), 10.5);
        assert_eq!(align_coord(9.8, 1.0), 9.5);
        assert_eq!(align_coord(10.1, 2.0), 10.25);
    }

    #[test]
    fn test_exact_pixel_is_unchanged() {
        assert_eq!(align_coord(10.0, 1.0), 10.0);
        assert_eq!(align_coord(0.0, 2.0), 0.0);
    }

    #[test]
    fn test_within_half_pixel() {
        for &s in &SCALES {
            for &x in &COORDS {
                let a = align_coord(x, s);
                assert!(
                    (a - x).abs() <= 0.5 / s + 1e-9,
                    "align({x}, {s}) = {a} drifted too far"
                );
            }
        }
    }

    #[test]
    fn test_idempotent() {
        for &s in &SCALES {
            for &x in &COORDS {
                let once = align_coord(x, s);
                assert_eq!(align_coord(once, s), once, "x = {x}, s = {s}");
            }
        }
    }

    #[test]
    fn test_scaling_factors_follow_rotation() {
        let t = DAffine2::from_scale(DVec2::new(2.0, 3.0)) * DAffine2::from_angle(FRAC_PI_2);
        let s = scaling_factors(&t);
        assert!((s.x - 2.0).abs() < 1e-12);
        assert!((s.y - 3.0).abs() < 1e-12);

        let identity = scaling_factors(&DAffine2::IDENTITY);
        assert_eq!(identity, DVec2::ONE);
    }
}
