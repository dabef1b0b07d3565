use std::ops::{Deref, DerefMut};

use thiserror::Error;
use tracing::warn;

use super::transform::Rect;
use crate::frame::Raster;

/// Display surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("canvas lock failed: {0}")]
    Lock(String),

    #[error("canvas post failed: {0}")]
    Post(String),
}

/// Colour and size settings for overlay drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Packed ARGB colour.
    pub color: u32,
    /// Line width in display pixels.
    pub stroke_width: f32,
    /// Text height in display pixels.
    pub text_size: f32,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: 0xFFFF_FF00,
            stroke_width: 8.0,
            text_size: 60.0,
        }
    }
}

/// Drawing operations the overlay needs from a display.
pub trait Canvas {
    /// Current size in pixels. May change between frames.
    fn size(&self) -> (u32, u32);

    /// Clear every pixel to transparent.
    fn clear(&mut self);

    /// Draw `raster` stretched into `dest`.
    fn draw_raster(&mut self, raster: &Raster, dest: Rect);

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, paint: &Paint);

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), paint: &Paint);

    /// Draw `text` with its baseline starting at `origin`.
    fn draw_text(&mut self, text: &str, origin: (f32, f32), paint: &Paint);
}

/// A canvas that must be locked before drawing and posted afterwards.
pub trait DisplaySurface: Canvas + Send {
    fn lock(&mut self) -> Result<(), SurfaceError>;

    /// Release the lock and present what was drawn.
    fn unlock_and_post(&mut self) -> Result<(), SurfaceError>;
}

/// Scoped lock on a [`DisplaySurface`].
///
/// Dereferences to the surface for drawing. The surface is unlocked and
/// posted when the guard is dropped, so every exit path releases it; call
/// [`SurfaceLock::post`] instead to observe the post result.
pub struct SurfaceLock<'a, S: DisplaySurface + ?Sized> {
    surface: &'a mut S,
    released: bool,
}

impl<'a, S: DisplaySurface + ?Sized> SurfaceLock<'a, S> {
    pub fn acquire(surface: &'a mut S) -> Result<Self, SurfaceError> {
        surface.lock()?;
        Ok(Self {
            surface,
            released: false,
        })
    }

    /// Unlock and post now, returning any post error.
    pub fn post(mut self) -> Result<(), SurfaceError> {
        self.released = true;
        self.surface.unlock_and_post()
    }
}

impl<S: DisplaySurface + ?Sized> Deref for SurfaceLock<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: DisplaySurface + ?Sized> DerefMut for SurfaceLock<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: DisplaySurface + ?Sized> Drop for SurfaceLock<'_, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.surface.unlock_and_post() {
            warn!("failed to release display surface: {e}");
        }
    }
}
