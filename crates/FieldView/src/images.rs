//! # Background Imagery
//!
//! The field art is fetched by the host. The library only says *which* URL it wants
//! (through an [`ImageLoader`]) and is told later, via
//! [`crate::FieldRenderer::image_loaded`] or [`crate::FieldRenderer::image_failed`],
//! how that went.
//!
//! Two slots exist: the **base** image, requested once at construction, and the **alt**
//! image, which `Image` operations may point at a new URL on any render pass.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::DVec2;
use tracing::{debug, info, warn};

use crate::surface::{Surface, SurfaceSize};
use crate::view::FieldRect;

/// Field span, in inches, that alt placements are expressed against.
pub const REFERENCE_FIELD_SPAN: f64 = 144.0;

/// Starts loading images. Fire-and-forget: completion is reported back separately.
pub trait ImageLoader {
    fn request(&mut self, url: &str);
}

/// An [`ImageLoader`] that only records requests.
///
/// Clones share one queue, so the host keeps a clone and drains it once per frame.
#[derive(Clone, Debug, Default)]
pub struct QueuedLoader {
    queue: Rc<RefCell<VecDeque<String>>>,
}

impl QueuedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns every pending request, oldest first.
    pub fn drain(&self) -> Vec<String> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl ImageLoader for QueuedLoader {
    fn request(&mut self, url: &str) {
        self.queue.borrow_mut().push_back(url.to_string());
    }
}

/// Load progress of one image slot. A failed image is simply never drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadState<I> {
    Pending,
    Loaded(I),
    Failed,
}

impl<I> LoadState<I> {
    pub fn image(&self) -> Option<&I> {
        match self {
            LoadState::Loaded(image) => Some(image),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ImageSlot<I> {
    url: String,
    state: LoadState<I>,
}

impl<I> ImageSlot<I> {
    fn pending(url: &str) -> Self {
        Self {
            url: url.to_string(),
            state: LoadState::Pending,
        }
    }
}

/// Where the alt image goes, in inches relative to a [`REFERENCE_FIELD_SPAN`] field
/// whose top-left corner is the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AltPlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Ignore the background alpha and draw fully opaque.
    pub opaque: bool,
}

impl AltPlacement {
    /// Position and size of the alt image inside `rect`, in surface units.
    ///
    /// The height is scaled by the width ratio. Existing field art is authored
    /// against that behavior.
    pub fn resolve(&self, rect: &FieldRect) -> (DVec2, DVec2) {
        let sx = rect.width / REFERENCE_FIELD_SPAN;
        let sy = rect.height / REFERENCE_FIELD_SPAN;
        (
            DVec2::new(rect.x + self.x * sx, rect.y + self.y * sy),
            DVec2::new(self.width * sx, self.height * sx),
        )
    }
}

/// Base and alt field images for one renderer.
pub struct BackgroundImageCache<I> {
    loader: Box<dyn ImageLoader>,
    base: Option<ImageSlot<I>>,
    alt: Option<ImageSlot<I>>,
    placement: AltPlacement,
    deferred: Option<SurfaceSize>,
}

impl<I> BackgroundImageCache<I> {
    pub fn new(loader: Box<dyn ImageLoader>) -> Self {
        Self {
            loader,
            base: None,
            alt: None,
            placement: AltPlacement::default(),
            deferred: None,
        }
    }

    pub fn load_base(&mut self, url: &str) {
        debug!(url, "requesting base field image");
        self.base = Some(ImageSlot::pending(url));
        self.loader.request(url);
    }

    /// Points the alt slot at `url` and requests it.
    ///
    /// The slot always goes back to pending, even for the URL it already holds, so the
    /// old image disappears until the new request completes.
    pub fn set_alt(&mut self, url: &str, placement: AltPlacement) {
        debug!(url, ?placement, "requesting alt field image");
        self.alt = Some(ImageSlot::pending(url));
        self.placement = placement;
        self.loader.request(url);
    }

    /// Records a finished load.
    ///
    /// Returns the size of a render that was deferred while the base image was
    /// missing, if this completion loaded the base image. Completions for URLs that no
    /// slot currently wants are dropped.
    pub fn complete(&mut self, url: &str, image: I) -> Option<SurfaceSize>
    where
        I: Clone,
    {
        let mut replay = None;
        let mut matched = false;

        if let Some(alt) = self.alt.as_mut().filter(|slot| slot.url == url) {
            info!(url, "alt field image loaded");
            alt.state = LoadState::Loaded(image.clone());
            matched = true;
        }
        if let Some(base) = self.base.as_mut().filter(|slot| slot.url == url) {
            info!(url, "base field image loaded");
            base.state = LoadState::Loaded(image);
            replay = self.deferred.take();
            matched = true;
        }
        if !matched {
            warn!(url, "ignoring stale image completion");
        }
        replay
    }

    /// Records a failed load. The affected image stays absent.
    pub fn fail(&mut self, url: &str) {
        let mut matched = false;
        for slot in [self.base.as_mut(), self.alt.as_mut()].into_iter().flatten() {
            if slot.url == url {
                slot.state = LoadState::Failed;
                matched = true;
            }
        }
        if matched {
            warn!(url, "field image failed to load");
        } else {
            warn!(url, "ignoring stale image failure");
        }
    }

    pub fn is_base_loaded(&self) -> bool {
        self.base_image().is_some()
    }

    pub fn is_alt_loaded(&self) -> bool {
        self.alt_image().is_some()
    }

    pub fn base_state(&self) -> Option<&LoadState<I>> {
        self.base.as_ref().map(|slot| &slot.state)
    }

    pub fn alt_state(&self) -> Option<&LoadState<I>> {
        self.alt.as_ref().map(|slot| &slot.state)
    }

    pub fn alt_url(&self) -> Option<&str> {
        self.alt.as_ref().map(|slot| slot.url.as_str())
    }

    pub fn placement(&self) -> AltPlacement {
        self.placement
    }

    /// Remembers a render to replay once the base image arrives. Only the latest
    /// request is kept.
    pub fn defer_render(&mut self, size: SurfaceSize) {
        debug!(width = size.width, height = size.height, "deferring render until base image loads");
        self.deferred = Some(size);
    }

    pub fn has_deferred_render(&self) -> bool {
        self.deferred.is_some()
    }

    pub fn draw_base<S>(&self, surface: &mut S, rect: &FieldRect, alpha: f64)
    where
        S: Surface<Image = I> + ?Sized,
    {
        if let Some(image) = self.base_image() {
            surface.set_global_alpha(alpha);
            surface.draw_image(image, rect.x, rect.y, rect.width, rect.height);
        }
    }

    pub fn draw_alt<S>(&self, surface: &mut S, rect: &FieldRect, alpha: f64)
    where
        S: Surface<Image = I> + ?Sized,
    {
        if let Some(image) = self.alt_image() {
            let (position, size) = self.placement.resolve(rect);
            surface.set_global_alpha(if self.placement.opaque { 1.0 } else { alpha });
            surface.draw_image(image, position.x, position.y, size.x, size.y);
            surface.set_global_alpha(alpha);
        }
    }

    fn base_image(&self) -> Option<&I> {
        self.base.as_ref().and_then(|slot| slot.state.image())
    }

    fn alt_image(&self) -> Option<&I> {
        self.alt.as_ref().and_then(|slot| slot.state.image())
    }
}
