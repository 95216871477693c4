//! # Recording Surface
//!
//! A headless [`Surface`] that turns drawing calls into a display list of
//! [`DrawCommand`]s in **device space**. Hosts (macroquad, egui, a test) replay the list
//! however they like; the library itself never touches pixels.

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::SurfaceError;
use crate::surface::{LineCap, Surface, SurfaceSize};

/// One element of a recorded path, already transformed to device pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PathElement {
    MoveTo(DVec2),
    LineTo(DVec2),
    /// Circular arc. Angles are the ones given in user space; the radius is scaled
    /// by the uniform part of the transform.
    Arc {
        center: DVec2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Close,
}

/// A single drawing primitive.
///
/// Coordinates are in **Device Space** (physical pixels).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand<I> {
    /// The surface was cleared to `width` x `height` device pixels.
    Clear { width: f64, height: f64 },
    /// A filled path.
    Fill {
        path: Vec<PathElement>,
        color: Color,
        /// Global alpha in effect, multiplied with the color's own alpha by the host.
        alpha: f64,
    },
    /// A stroked path.
    Stroke {
        path: Vec<PathElement>,
        color: Color,
        alpha: f64,
        /// Line width in device pixels.
        width: f64,
        cap: LineCap,
    },
    /// A text run anchored at `position`.
    Text {
        text: String,
        position: DVec2,
        /// Full user-to-device transform at the time of drawing, for hosts that can
        /// render rotated or mirrored glyphs.
        transform: DAffine2,
        font: String,
        color: Color,
        alpha: f64,
        /// Outlined (`stroke_text`) rather than filled.
        outlined: bool,
    },
    /// An image scaled into an axis-aligned rectangle.
    Image {
        image: I,
        position: DVec2,
        size: DVec2,
        alpha: f64,
    },
}

/// A list of draw commands representing the current frame.
pub type RenderList<I> = Vec<DrawCommand<I>>;

#[derive(Clone, Debug)]
struct PaintState {
    transform: DAffine2,
    fill: Color,
    stroke: Color,
    line_width: f64,
    line_cap: LineCap,
    font: String,
    alpha: f64,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            transform: DAffine2::IDENTITY,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            font: "10px sans-serif".to_string(),
            alpha: 1.0,
        }
    }
}

impl PaintState {
    /// Length scale of the current transform, exact for similarity transforms.
    fn uniform_scale(&self) -> f64 {
        self.transform.matrix2.determinant().abs().sqrt()
    }
}

/// A [`Surface`] that records what it is asked to draw.
#[derive(Clone, Debug)]
pub struct RecordingSurface<I> {
    state: PaintState,
    stack: Vec<PaintState>,
    path: Vec<PathElement>,
    commands: RenderList<I>,
    introspection: bool,
}

impl<I> Default for RecordingSurface<I> {
    fn default() -> Self {
        Self {
            state: PaintState::default(),
            stack: Vec::new(),
            path: Vec::new(),
            commands: Vec::new(),
            introspection: true,
        }
    }
}

impl<I> RecordingSurface<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that refuses to report its transform, like old canvas implementations.
    pub fn without_transform_introspection() -> Self {
        Self {
            introspection: false,
            ..Self::default()
        }
    }

    /// Commands recorded since the last [`Surface::reset`].
    pub fn commands(&self) -> &[DrawCommand<I>] {
        &self.commands
    }

    /// Hands the recorded commands to the caller, leaving the list empty.
    pub fn take_commands(&mut self) -> RenderList<I> {
        std::mem::take(&mut self.commands)
    }

    fn to_device(&self, x: f64, y: f64) -> DVec2 {
        self.state.transform.transform_point2(DVec2::new(x, y))
    }

    fn push_text(&mut self, text: &str, x: f64, y: f64, outlined: bool) {
        let color = if outlined {
            self.state.stroke
        } else {
            self.state.fill
        };
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position: self.to_device(x, y),
            transform: self.state.transform,
            font: self.state.font.clone(),
            color,
            alpha: self.state.alpha,
            outlined,
        });
    }
}

impl<I: Clone> Surface for RecordingSurface<I> {
    type Image = I;

    fn reset(&mut self, size: SurfaceSize) {
        self.state = PaintState::default();
        self.stack.clear();
        self.path.clear();
        self.commands.clear();
        self.commands.push(DrawCommand::Clear {
            width: size.width,
            height: size.height,
        });
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&self) -> Result<DAffine2, SurfaceError> {
        if self.introspection {
            Ok(self.state.transform)
        } else {
            Err(SurfaceError::TransformUnavailable)
        }
    }

    fn set_transform(&mut self, transform: DAffine2) {
        self.state.transform = transform;
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.state.transform = self.state.transform * DAffine2::from_translation(DVec2::new(x, y));
    }

    fn scale(&mut self, x: f64, y: f64) {
        self.state.transform = self.state.transform * DAffine2::from_scale(DVec2::new(x, y));
    }

    fn rotate(&mut self, angle: f64) {
        self.state.transform = self.state.transform * DAffine2::from_angle(angle);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        // Canvas ignores out-of-range alpha instead of clamping it.
        if (0.0..=1.0).contains(&alpha) {
            self.state.alpha = alpha;
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    fn set_font(&mut self, font: &str) {
        self.state.font = font.to_string();
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let p = self.to_device(x, y);
        self.path.push(PathElement::MoveTo(p));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let p = self.to_device(x, y);
        self.path.push(PathElement::LineTo(p));
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        let center = self.to_device(x, y);
        self.path.push(PathElement::Arc {
            center,
            radius: radius * self.state.uniform_scale(),
            start_angle,
            end_angle,
        });
    }

    fn close_path(&mut self) {
        self.path.push(PathElement::Close);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill {
            path: self.path.clone(),
            color: self.state.fill,
            alpha: self.state.alpha,
        });
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke {
            path: self.path.clone(),
            color: self.state.stroke,
            alpha: self.state.alpha,
            width: self.state.line_width * self.state.uniform_scale(),
            cap: self.state.line_cap,
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.push_text(text, x, y, false);
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) {
        self.push_text(text, x, y, true);
    }

    fn draw_image(&mut self, image: &I, x: f64, y: f64, width: f64, height: f64) {
        let position = self.to_device(x, y);
        let size = self
            .state
            .transform
            .transform_vector2(DVec2::new(width, height));
        self.commands.push(DrawCommand::Image {
            image: image.clone(),
            position,
            size,
            alpha: self.state.alpha,
        });
    }
}
