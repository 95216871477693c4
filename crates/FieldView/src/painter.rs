use std::f64::consts::TAU;

use glam::DVec2;
use tracing::{error, warn};

use crate::align::PixelAligner;
use crate::color::Color;
use crate::error::RenderError;
use crate::images::{AltPlacement, BackgroundImageCache};
use crate::math::CurveSampler;
use crate::model::{self, GridTicks, Op};
use crate::surface::Surface;
use crate::view::TransformContext;

/// Paint and transform state threaded through one interpreter run.
///
/// Each operation changes a subset of the fields; everything else carries over.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderState {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    pub alpha: f64,
    /// Alt origin, in field inches.
    pub origin: DVec2,
    /// Alt rotation, in radians.
    pub rotation: f64,
    pub grid: GridTicks,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            fill: Color::BLACK,
            stroke: Color::BLACK,
            stroke_width: 1.0,
            alpha: 1.0,
            origin: DVec2::ZERO,
            rotation: 0.0,
            grid: GridTicks::default(),
        }
    }
}

impl RenderState {
    /// Fresh state carrying over the grid ticks a renderer has kept from earlier passes.
    pub fn seeded(grid: GridTicks) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }
}

/// Executes overlay operations against a surface.
///
/// The surface must already hold the base transform recorded in `transforms`.
pub struct OverlayInterpreter<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    images: &'a mut BackgroundImageCache<S::Image>,
    transforms: &'a TransformContext,
    sampler: CurveSampler,
    state: RenderState,
}

impl<'a, S: Surface + ?Sized> OverlayInterpreter<'a, S> {
    pub fn new(
        surface: &'a mut S,
        images: &'a mut BackgroundImageCache<S::Image>,
        transforms: &'a TransformContext,
        sampler: CurveSampler,
        state: RenderState,
    ) -> Self {
        Self {
            surface,
            images,
            transforms,
            sampler,
            state,
        }
    }

    pub fn into_state(self) -> RenderState {
        self.state
    }

    /// Runs `ops` in order.
    ///
    /// Stops at the first failing operation. Whatever was drawn before it stays drawn
    /// and nothing after it runs.
    pub fn run(&mut self, ops: &[Op]) -> Result<(), RenderError> {
        for (index, op) in ops.iter().enumerate() {
            self.apply(index, op)?;
        }
        Ok(())
    }

    fn apply(&mut self, index: usize, op: &Op) -> Result<(), RenderError> {
        match op {
            Op::Image {
                src,
                x,
                y,
                width,
                height,
                opaque,
            } => {
                self.images.set_alt(
                    src,
                    AltPlacement {
                        x: *x,
                        y: *y,
                        width: *width,
                        height: *height,
                        opaque: *opaque,
                    },
                );
            }
            Op::Grid {
                num_horizontal,
                num_vertical,
            } => {
                self.state.grid = GridTicks::clamped(*num_horizontal, *num_vertical);
                if self.state.grid.is_excessive() {
                    warn!(
                        horizontal = self.state.grid.horizontal,
                        vertical = self.state.grid.vertical,
                        index,
                        "grid line count is unusually large"
                    );
                }
            }
            Op::Scale { scale_x, scale_y } => {
                self.reset_alt_transform();
                self.surface.scale(*scale_x, *scale_y);
            }
            Op::Rotation { rotation } => {
                self.state.rotation = *rotation;
                self.reset_alt_transform();
            }
            Op::Origin { x, y } => {
                self.state.origin = DVec2::new(*x, *y);
                self.reset_alt_transform();
            }
            Op::Alpha { alpha } => {
                self.surface.set_global_alpha(*alpha);
                if (0.0..=1.0).contains(alpha) {
                    self.state.alpha = *alpha;
                }
            }
            Op::Fill { color } => {
                if let Some(color) = parse_color(color, index) {
                    self.state.fill = color;
                    self.surface.set_fill_color(color);
                }
            }
            Op::Stroke { color } => {
                if let Some(color) = parse_color(color, index) {
                    self.state.stroke = color;
                    self.surface.set_stroke_color(color);
                }
            }
            Op::StrokeWidth { width } => {
                self.surface.set_line_width(*width);
                if width.is_finite() && *width > 0.0 {
                    self.state.stroke_width = *width;
                }
            }
            Op::Text {
                text,
                x,
                y,
                font,
                theta,
                stroke,
            } => self.draw_text(text, *x, *y, font.as_deref(), *theta, *stroke),
            Op::Circle {
                x,
                y,
                radius,
                stroke,
            } => {
                self.surface.begin_path();
                self.surface.arc(*x, *y, *radius, 0.0, TAU);
                self.finish_path(*stroke);
            }
            Op::Polygon {
                x_points,
                y_points,
                stroke,
            } => {
                let points = model::zip_points(x_points, y_points);
                self.surface.begin_path();
                PixelAligner::new(&mut *self.surface).polyline(&points)?;
                if !points.is_empty() {
                    self.surface.close_path();
                }
                self.finish_path(*stroke);
            }
            Op::Polyline { x_points, y_points } => {
                let points = model::zip_points(x_points, y_points);
                self.surface.begin_path();
                PixelAligner::new(&mut *self.surface).polyline(&points)?;
                self.surface.stroke();
            }
            Op::Spline(spline) => {
                let samples = self.sampler.sample(&spline.x_axis(), &spline.y_axis());
                self.surface.begin_path();
                if let Some((start, rest)) = samples.split_first() {
                    // Only the start is snapped; snapping every sample makes curves jagged.
                    PixelAligner::new(&mut *self.surface).move_to(start.x, start.y)?;
                    for p in rest {
                        self.surface.line_to(p.x, p.y);
                    }
                }
                self.surface.stroke();
            }
            Op::Unknown { kind } => {
                error!(kind = %kind, index, "unknown overlay operation, aborting render pass");
                return Err(RenderError::UnknownOperation {
                    kind: kind.clone(),
                    index,
                });
            }
        }
        Ok(())
    }

    fn reset_alt_transform(&mut self) {
        self.transforms
            .reset_to_baseline(&mut *self.surface, self.state.origin, self.state.rotation);
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, font: Option<&str>, theta: f64, stroke: bool) {
        self.surface.save();
        self.surface.rotate(theta);
        if let Some(font) = font {
            self.surface.set_font(font);
        }
        // Undo the field's Y flip locally so glyphs are not mirrored.
        self.surface.scale(1.0, -1.0);
        if stroke {
            self.surface.stroke_text(text, x, y);
        } else {
            self.surface.fill_text(text, x, y);
        }
        self.surface.restore();
    }

    fn finish_path(&mut self, stroke: bool) {
        if stroke {
            self.surface.stroke();
        } else {
            self.surface.fill();
        }
    }
}

// Invalid colors leave the current color in place, as a canvas does.
fn parse_color(color: &str, index: usize) -> Option<Color> {
    match color.parse() {
        Ok(color) => Some(color),
        Err(err) => {
            warn!(color, index, %err, "ignoring invalid overlay color");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::QueuedLoader;
    use crate::render::{DrawCommand, PathElement, RecordingSurface};
    use std::num::NonZeroUsize;

    struct Harness {
        surface: RecordingSurface<String>,
        images: BackgroundImageCache<String>,
        transforms: TransformContext,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                surface: RecordingSurface::new(),
                images: BackgroundImageCache::new(Box::new(QueuedLoader::new())),
                transforms: TransformContext::default(),
            }
        }

        fn run(&mut self, ops: &[Op]) -> (Result<(), RenderError>, RenderState) {
            let sampler = CurveSampler::new(NonZeroUsize::new(4).unwrap());
            let mut interpreter = OverlayInterpreter::new(
                &mut self.surface,
                &mut self.images,
                &self.transforms,
                sampler,
                RenderState::default(),
            );
            let result = interpreter.run(ops);
            (result, interpreter.into_state())
        }
    }

    #[test]
    fn test_state_carries_over() {
        let mut h = Harness::new();
        let (result, state) = h.run(&[
            Op::Stroke {
                color: "blue".into(),
            },
            Op::StrokeWidth { width: 3.0 },
            Op::Alpha { alpha: 0.5 },
            Op::Fill {
                color: "bogus".into(),
            },
        ]);
        assert!(result.is_ok());
        assert_eq!(state.stroke, Color::rgb(0, 0, 255));
        assert_eq!(state.stroke_width, 3.0);
        assert_eq!(state.alpha, 0.5);
        assert_eq!(state.fill, Color::BLACK);
    }

    #[test]
    fn test_spline_strokes_steps_plus_one_points() {
        let mut h = Harness::new();
        let spline = model::SplineOp {
            ex: 10.0,
            fx: 0.25,
            ..Default::default()
        };
        h.run(&[Op::Spline(spline)]).0.unwrap();

        let [DrawCommand::Stroke { path, .. }] = h.surface.commands() else {
            panic!("expected one stroke, got {:?}", h.surface.commands());
        };
        assert_eq!(path.len(), 5);
        // Aligned start under the identity transform.
        assert_eq!(path[0], PathElement::MoveTo(DVec2::new(0.5, 0.0)));
        assert_eq!(path[4], PathElement::LineTo(DVec2::new(10.25, 0.0)));
    }

    #[test]
    fn test_polygon_closes_path() {
        let mut h = Harness::new();
        let square = [
            DVec2::new(0.0, 0.0),
            DVec2::new(4.0, 0.0),
            DVec2::new(4.0, 4.0),
        ];
        h.run(&[Op::polygon(&square, true)]).0.unwrap();

        let [DrawCommand::Stroke { path, .. }] = h.surface.commands() else {
            panic!("expected one stroke");
        };
        assert_eq!(path.len(), 4);
        assert_eq!(path[3], PathElement::Close);
    }

    #[test]
    fn test_large_grid_still_applied() {
        let mut h = Harness::new();
        let (result, state) = h.run(&[Op::Grid {
            num_horizontal: 5_000,
            num_vertical: 1,
        }]);
        assert!(result.is_ok());
        assert_eq!(
            state.grid,
            GridTicks {
                horizontal: 5_000,
                vertical: 2
            }
        );
        assert!(state.grid.is_excessive());
    }

    #[test]
    fn test_image_op_sets_alt() {
        let mut h = Harness::new();
        let (result, _) = h.run(&[Op::Image {
            src: "alt.png".into(),
            x: 0.0,
            y: 0.0,
            width: 144.0,
            height: 144.0,
            opaque: true,
        }]);
        assert!(result.is_ok());
        assert_eq!(h.images.alt_url(), Some("alt.png"));
        assert!(h.images.placement().opaque);
    }
}
