//! # FieldView
//!
//! `field_view` draws a competition-field diagram and overlays the drawing operations a
//! robot streams over telemetry (paths, markers, text, grid changes, alternate field art).
//! It is headless: the host owns the drawing target, exposes it through [`Surface`], and
//! decides when to render.
//!
//! ## Core Architecture
//! - **Model (`src/model.rs`)**: The [`Overlay`] operation list and its wire format.
//! - **View (`src/view.rs`)**: Field-inch to surface coordinate transforms.
//! - **Painter (`src/painter.rs`)**: Interprets overlay operations against a surface.
//! - **Images (`src/images.rs`)**: Asynchronously loaded field art.
//! - **Render (`src/render.rs`)**: A recording surface that outputs `DrawCommand`s for
//!   hosts without a canvas-like API.

pub mod align;
pub mod color;
pub mod config;
pub mod error;
pub mod images;
pub mod math;
pub mod model;
pub mod painter;
pub mod persistence;
pub mod render;
pub mod surface;
pub mod view;

use tracing::debug;

use align::PixelAligner;
use images::{BackgroundImageCache, ImageLoader};
use math::CurveSampler;
use model::GridTicks;
use painter::{OverlayInterpreter, RenderState};
use view::{FieldRect, TransformContext};

// Re-exports for convenience
pub use color::Color;
pub use config::FieldOptions;
pub use error::{ConfigError, OverlayError, RenderError, SurfaceError};
pub use images::QueuedLoader;
pub use model::{Op, Overlay};
pub use render::{DrawCommand, PathElement, RecordingSurface, RenderList};
pub use surface::{LineCap, Surface, SurfaceSize};

/// The main entry point for the library.
///
/// A `FieldRenderer` owns one surface, the field art for it and the overlay to draw on
/// top. It is single-threaded: one render pass must finish before the next begins.
pub struct FieldRenderer<S: Surface> {
    surface: S,
    options: FieldOptions,
    overlay: Overlay,
    images: BackgroundImageCache<S::Image>,
    transforms: TransformContext,
    /// Grid ticks persist across passes until a `Grid` operation changes them.
    grid: GridTicks,
}

impl<S: Surface> FieldRenderer<S> {
    /// Creates a renderer and requests the base field image from `loader`.
    pub fn new(surface: S, options: FieldOptions, loader: impl ImageLoader + 'static) -> Self {
        let mut images = BackgroundImageCache::new(Box::new(loader));
        images.load_base(&options.field_image);
        Self {
            surface,
            options,
            overlay: Overlay::default(),
            images,
            transforms: TransformContext::default(),
            grid: GridTicks::default(),
        }
    }

    /// Replaces the operations drawn by the next [`render`](Self::render).
    ///
    /// Nothing is validated until the operations are interpreted.
    pub fn set_overlay(&mut self, overlay: Overlay) {
        self.overlay = overlay;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn images(&self) -> &BackgroundImageCache<S::Image> {
        &self.images
    }

    /// Grid line counts the next pass will draw.
    pub fn grid_ticks(&self) -> GridTicks {
        self.grid
    }

    /// Base transform captured by the most recent pass.
    pub fn base_transform(&self) -> glam::DAffine2 {
        self.transforms.base()
    }

    /// Redraws the whole field for a surface of `size`.
    ///
    /// If the base field image has not loaded yet the pass still runs, and is repeated
    /// automatically once the image arrives.
    pub fn render(&mut self, size: SurfaceSize) -> Result<(), RenderError> {
        debug!(
            width = size.width,
            height = size.height,
            device_pixel_ratio = size.device_pixel_ratio,
            ops = self.overlay.ops.len(),
            "rendering field"
        );

        self.surface.reset(size);
        // Pixel alignment needs the transform, so fail before drawing anything.
        self.surface.transform()?;

        let ratio = size.device_pixel_ratio;
        self.surface.scale(ratio, ratio);

        let (width, height) = size.logical();
        let rect = FieldRect::centered_square(width, height, self.options.padding);

        if !self.images.is_base_loaded() {
            self.images.defer_render(size);
        }

        self.draw_background(&rect);
        self.draw_grid(&rect, ratio)?;
        self.draw_overlay(&rect)
    }

    /// Reports that the host failed to load `url`. The image is never drawn.
    pub fn image_failed(&mut self, url: &str) {
        self.images.fail(url);
    }

    fn draw_background(&mut self, rect: &FieldRect) {
        let alpha = self.options.alpha;
        self.surface.save();
        self.surface.set_global_alpha(alpha);
        self.images.draw_base(&mut self.surface, rect, alpha);
        self.images.draw_alt(&mut self.surface, rect, alpha);
        self.surface.restore();
    }

    fn draw_grid(&mut self, rect: &FieldRect, ratio: f64) -> Result<(), SurfaceError> {
        self.surface.save();
        self.surface.set_stroke_color(self.options.grid_line_color);
        // Configured in device pixels; the surface is already scaled by `ratio`.
        self.surface.set_line_width(self.options.grid_line_width / ratio);
        let result = self.stroke_grid_lines(rect);
        self.surface.restore();
        result
    }

    fn stroke_grid_lines(&mut self, rect: &FieldRect) -> Result<(), SurfaceError> {
        let GridTicks {
            horizontal,
            vertical,
        } = self.grid;
        let spacing_x = rect.width / horizontal.saturating_sub(1).max(1) as f64;
        let spacing_y = rect.height / vertical.saturating_sub(1).max(1) as f64;

        for i in 0..horizontal {
            let x = rect.x + spacing_x * i as f64;
            self.surface.begin_path();
            let mut aligner = PixelAligner::new(&mut self.surface);
            aligner.move_to(x, rect.y)?;
            aligner.line_to(x, rect.y + rect.height)?;
            self.surface.stroke();
        }

        for i in 0..vertical {
            let y = rect.y + spacing_y * i as f64;
            self.surface.begin_path();
            let mut aligner = PixelAligner::new(&mut self.surface);
            aligner.move_to(rect.x, y)?;
            aligner.line_to(rect.x + rect.width, y)?;
            self.surface.stroke();
        }

        Ok(())
    }

    fn draw_overlay(&mut self, rect: &FieldRect) -> Result<(), RenderError> {
        self.surface.save();
        let result = self.run_overlay(rect);
        self.surface.restore();
        result
    }

    fn run_overlay(&mut self, rect: &FieldRect) -> Result<(), RenderError> {
        self.transforms
            .establish(&mut self.surface, rect, self.options.field_size)?;
        self.surface.set_line_cap(LineCap::Butt);

        let mut interpreter = OverlayInterpreter::new(
            &mut self.surface,
            &mut self.images,
            &self.transforms,
            CurveSampler::new(self.options.spline_samples),
            RenderState::seeded(self.grid),
        );
        let result = interpreter.run(&self.overlay.ops);

        // Grid changes stick even when a later operation aborted the pass.
        self.grid = interpreter.into_state().grid;
        result
    }
}

impl<S: Surface> FieldRenderer<S>
where
    S::Image: Clone,
{
    /// Hands over an image the host finished loading.
    ///
    /// When this is the base field image, a render that ran without it is replayed.
    pub fn image_loaded(&mut self, url: &str, image: S::Image) -> Result<(), RenderError> {
        match self.images.complete(url, image) {
            Some(size) => {
                debug!(url, "replaying deferred render");
                self.render(size)
            }
            None => Ok(()),
        }
    }
}
