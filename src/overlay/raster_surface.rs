use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use tracing::warn;

use super::canvas::{Canvas, DisplaySurface, Paint, SurfaceError};
use super::transform::Rect;
use crate::frame::scale::Scaler;
use crate::frame::types::argb_to_rgba;
use crate::frame::Raster;

/// Text drawn onto a [`RasterSurface`].
///
/// The surface has no font rasteriser; labels are kept alongside the pixels
/// for the host to composite.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub color: u32,
    pub size: f32,
}

/// In-memory RGBA display surface.
///
/// Stands in for an on-screen surface: it enforces lock/post pairing and
/// keeps a copy of the last posted frame.
pub struct RasterSurface {
    back: RgbaImage,
    front: RgbaImage,
    labels: Vec<TextLabel>,
    posted_labels: Vec<TextLabel>,
    locked: bool,
    posted_frames: u64,
    scaler: Scaler,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            back: RgbaImage::new(width, height),
            front: RgbaImage::new(width, height),
            labels: Vec::new(),
            posted_labels: Vec::new(),
            locked: false,
            posted_frames: 0,
            scaler: Scaler::new(),
        }
    }

    /// Change the surface size, as when a window or view is resized.
    /// Takes effect for the next lock.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.back = RgbaImage::new(width, height);
    }

    /// The most recently posted frame.
    pub fn posted(&self) -> &RgbaImage {
        &self.front
    }

    /// Text labels of the most recently posted frame.
    pub fn posted_labels(&self) -> &[TextLabel] {
        &self.posted_labels
    }

    pub fn posted_frames(&self) -> u64 {
        self.posted_frames
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Write the last posted frame to a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.front.save_with_format(path, image::ImageFormat::Png)
    }

    /// Consume the surface and return its drawing buffer.
    pub fn into_image(self) -> RgbaImage {
        self.back
    }

    /// Labels drawn since the last clear.
    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }
}

fn to_point(p: (f32, f32)) -> Point<i32> {
    Point::new(p.0.round() as i32, p.1.round() as i32)
}

impl Canvas for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.back.dimensions()
    }

    fn clear(&mut self) {
        self.back.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
        self.labels.clear();
    }

    fn draw_raster(&mut self, raster: &Raster, dest: Rect) {
        if dest.width == 0 || dest.height == 0 {
            return;
        }
        let scaled = match self.scaler.scale(raster, dest.width, dest.height) {
            Ok(scaled) => scaled,
            Err(e) => {
                warn!("skipping raster blit: {e}");
                return;
            }
        };
        image::imageops::replace(
            &mut self.back,
            &scaled.to_rgba_image(),
            i64::from(dest.left),
            i64::from(dest.top),
        );
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, paint: &Paint) {
        let c = to_point(center);
        draw_filled_circle_mut(
            &mut self.back,
            (c.x, c.y),
            radius.round() as i32,
            argb_to_rgba(paint.color),
        );
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), paint: &Paint) {
        let color = argb_to_rgba(paint.color);
        let half = paint.stroke_width / 2.0;
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len = (dx * dx + dy * dy).sqrt();

        // Thin strokes and zero-length lines degrade to a 1px segment; the
        // polygon path needs corners that stay distinct after rounding.
        if half <= 1.0 || len < f32::EPSILON {
            draw_line_segment_mut(&mut self.back, from, to, color);
            return;
        }

        let (nx, ny) = (-dy / len * half, dx / len * half);
        let corners = [
            to_point((from.0 + nx, from.1 + ny)),
            to_point((to.0 + nx, to.1 + ny)),
            to_point((to.0 - nx, to.1 - ny)),
            to_point((from.0 - nx, from.1 - ny)),
        ];
        draw_polygon_mut(&mut self.back, &corners, color);
    }

    fn draw_text(&mut self, text: &str, origin: (f32, f32), paint: &Paint) {
        self.labels.push(TextLabel {
            text: text.to_string(),
            x: origin.0,
            y: origin.1,
            color: paint.color,
            size: paint.text_size,
        });
    }
}

impl DisplaySurface for RasterSurface {
    fn lock(&mut self) -> Result<(), SurfaceError> {
        if self.locked {
            return Err(SurfaceError::Lock("surface is already locked".to_string()));
        }
        if self.back.width() == 0 || self.back.height() == 0 {
            return Err(SurfaceError::Lock("surface has no pixels".to_string()));
        }
        self.locked = true;
        Ok(())
    }

    fn unlock_and_post(&mut self) -> Result<(), SurfaceError> {
        if !self.locked {
            return Err(SurfaceError::Post("surface is not locked".to_string()));
        }
        self.locked = false;
        self.front.clone_from(&self.back);
        self.posted_labels.clone_from(&self.labels);
        self.posted_frames += 1;
        Ok(())
    }
}
