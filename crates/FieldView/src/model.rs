//! # Overlay Model
//!
//! Declarative drawing instructions supplied by telemetry. An [`Overlay`] is replaced
//! wholesale between render passes and never mutated by the renderer.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::math::SplineAxis;

/// Default number of grid lines along each axis.
pub const DEFAULT_GRID_TICKS: usize = 7;

/// Fewest grid lines a `Grid` operation may request.
pub const MIN_GRID_TICKS: usize = 2;

/// Grid line counts above this are drawn, but logged as suspicious.
pub const EXCESSIVE_GRID_TICKS: usize = 1_000;

/// The ordered list of drawing operations for one render pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(deserialize_with = "crate::persistence::deserialize_ops")]
    pub ops: Vec<Op>,
}

impl Overlay {
    pub fn new(ops: Vec<Op>) -> Self {
        Self { ops }
    }
}

/// One declarative drawing instruction.
///
/// Coordinates are field inches unless noted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Op {
    /// Swaps in alternate field art, placed against a 144 inch reference field.
    Image {
        src: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        /// Draw at full opacity instead of the background alpha.
        #[serde(default)]
        opaque: bool,
    },
    /// Sets the number of grid lines. Takes effect from the next render pass.
    #[serde(rename_all = "camelCase")]
    Grid {
        #[serde(deserialize_with = "crate::persistence::deserialize_count")]
        num_horizontal: i64,
        #[serde(deserialize_with = "crate::persistence::deserialize_count")]
        num_vertical: i64,
    },
    /// Scales on top of the alt transform until the next `Origin` or `Rotation`.
    #[serde(rename_all = "camelCase")]
    Scale { scale_x: f64, scale_y: f64 },
    /// Sets the alt rotation in radians.
    Rotation { rotation: f64 },
    /// Sets the alt origin.
    Origin { x: f64, y: f64 },
    Alpha { alpha: f64 },
    /// CSS fill color.
    Fill { color: String },
    /// CSS stroke color.
    Stroke { color: String },
    StrokeWidth { width: f64 },
    Text {
        text: String,
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        font: Option<String>,
        #[serde(default)]
        theta: f64,
        #[serde(default)]
        stroke: bool,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        #[serde(default)]
        stroke: bool,
    },
    #[serde(rename_all = "camelCase")]
    Polygon {
        x_points: Vec<f64>,
        y_points: Vec<f64>,
        #[serde(default)]
        stroke: bool,
    },
    #[serde(rename_all = "camelCase")]
    Polyline { x_points: Vec<f64>, y_points: Vec<f64> },
    Spline(SplineOp),
    /// An operation this renderer does not understand. Interpreting it aborts the pass.
    #[serde(skip)]
    Unknown { kind: String },
}

impl Op {
    /// Every `type` tag the interpreter knows.
    pub const KINDS: [&'static str; 14] = [
        "image",
        "grid",
        "scale",
        "rotation",
        "origin",
        "alpha",
        "fill",
        "stroke",
        "strokeWidth",
        "text",
        "circle",
        "polygon",
        "polyline",
        "spline",
    ];

    /// The `type` tag of this operation.
    pub fn kind(&self) -> &str {
        match self {
            Op::Image { .. } => "image",
            Op::Grid { .. } => "grid",
            Op::Scale { .. } => "scale",
            Op::Rotation { .. } => "rotation",
            Op::Origin { .. } => "origin",
            Op::Alpha { .. } => "alpha",
            Op::Fill { .. } => "fill",
            Op::Stroke { .. } => "stroke",
            Op::StrokeWidth { .. } => "strokeWidth",
            Op::Text { .. } => "text",
            Op::Circle { .. } => "circle",
            Op::Polygon { .. } => "polygon",
            Op::Polyline { .. } => "polyline",
            Op::Spline(_) => "spline",
            Op::Unknown { kind } => kind.as_str(),
        }
    }

    pub fn polygon(points: &[DVec2], stroke: bool) -> Self {
        let (x_points, y_points) = points.iter().map(|p| (p.x, p.y)).unzip();
        Op::Polygon {
            x_points,
            y_points,
            stroke,
        }
    }

    pub fn polyline(points: &[DVec2]) -> Self {
        let (x_points, y_points) = points.iter().map(|p| (p.x, p.y)).unzip();
        Op::Polyline { x_points, y_points }
    }
}

/// Pairs parallel coordinate lists into points, ignoring the excess of the longer one.
pub fn zip_points(xs: &[f64], ys: &[f64]) -> Vec<DVec2> {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| DVec2::new(x, y))
        .collect()
}

/// Coefficients of a two-axis spline segment, flattened the way telemetry sends them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SplineOp {
    pub ax: f64,
    pub bx: f64,
    pub cx: f64,
    pub dx: f64,
    pub ex: f64,
    pub fx: f64,
    pub ay: f64,
    pub by: f64,
    pub cy: f64,
    pub dy: f64,
    pub ey: f64,
    pub fy: f64,
}

impl SplineOp {
    pub fn x_axis(&self) -> SplineAxis {
        SplineAxis::new(self.ax, self.bx, self.cx, self.dx, self.ex, self.fx)
    }

    pub fn y_axis(&self) -> SplineAxis {
        SplineAxis::new(self.ay, self.by, self.cy, self.dy, self.ey, self.fy)
    }
}

/// Number of grid lines drawn along each axis.
///
/// `horizontal` lines are spread across the field width, `vertical` across its height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridTicks {
    pub horizontal: usize,
    pub vertical: usize,
}

impl Default for GridTicks {
    fn default() -> Self {
        Self {
            horizontal: DEFAULT_GRID_TICKS,
            vertical: DEFAULT_GRID_TICKS,
        }
    }
}

impl GridTicks {
    /// Counts requested by a `Grid` operation, each raised to at least [`MIN_GRID_TICKS`].
    pub fn clamped(horizontal: i64, vertical: i64) -> Self {
        let clamp = |n: i64| usize::try_from(n).unwrap_or(0).max(MIN_GRID_TICKS);
        Self {
            horizontal: clamp(horizontal),
            vertical: clamp(vertical),
        }
    }

    /// More lines along an axis than a field diagram can show.
    pub fn is_excessive(&self) -> bool {
        self.horizontal.max(self.vertical) > EXCESSIVE_GRID_TICKS
    }
}
