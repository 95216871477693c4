use std::num::NonZeroUsize;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// One axis of a path segment, as the robot's trajectory generator emits it:
/// `pos(t) = (a*t + b)*t^4 + c*t^3 + d*t^2 + e*t + f` for `t` in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SplineAxis {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl SplineAxis {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn eval(&self, t: f64) -> f64 {
        let t2 = t * t;
        (self.a * t + self.b) * (t2 * t2) + self.c * (t2 * t) + self.d * t2 + self.e * t + self.f
    }
}

/// Approximates a parametric curve with a polyline of evenly spaced parameter samples.
#[derive(Clone, Copy, Debug)]
pub struct CurveSampler {
    steps: NonZeroUsize,
}

impl CurveSampler {
    pub fn new(steps: NonZeroUsize) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> usize {
        self.steps.get()
    }

    /// Samples `t = 0/steps, 1/steps, ..., 1`, producing `steps + 1` points.
    ///
    /// The first point is exactly `(x.f, y.f)`, the curve's start.
    pub fn sample(&self, x: &SplineAxis, y: &SplineAxis) -> Vec<DVec2> {
        let steps = self.steps.get();
        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                DVec2::new(x.eval(t), y.eval(t))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler(steps: usize) -> CurveSampler {
        CurveSampler::new(NonZeroUsize::new(steps).unwrap())
    }

    #[test]
    fn test_starts_at_constant_term() {
        let x = SplineAxis::new(1.5, -2.0, 3.0, 0.25, 7.0, -12.5);
        let y = SplineAxis::new(-4.0, 0.5, 1.0, 9.0, -3.0, 33.0);
        let points = sampler(250).sample(&x, &y);
        assert_eq!(points[0], DVec2::new(-12.5, 33.0));
    }

    #[test]
    fn test_point_count() {
        let axis = SplineAxis::default();
        for steps in [1, 2, 7, 250] {
            assert_eq!(sampler(steps).sample(&axis, &axis).len(), steps + 1);
        }
    }

    #[test]
    fn test_ends_at_coefficient_sum() {
        let x = SplineAxis::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0);
        let y = SplineAxis::new(0.0, 0.0, 0.0, 0.0, 2.0, -1.0);
        let points = sampler(4).sample(&x, &y);
        assert_eq!(points[4], DVec2::new(21.0, 1.0));
        // Linear y axis samples evenly.
        assert_eq!(points[2].y, 0.0);
    }
}
