use image::RgbaImage;

use super::canvas::{Canvas, Paint};
use super::raster_surface::RasterSurface;
use super::transform::{Rect, RenderTransform};
use crate::frame::Raster;
use crate::pose::{BoneEdge, Keypoint, Pose, BONES};
use crate::settings::PipelineConfig;

/// Model-space anchors of the three diagnostic text lines.
const TEXT_X: f32 = 5.0;
const SCORE_Y: f32 = 190.0;
const DEVICE_Y: f32 = 220.0;
const TIME_Y: f32 = 250.0;

/// What one render call actually drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub joints: usize,
    pub bones: usize,
}

/// Draws the model input, the detected skeleton, and diagnostic text.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonRenderer {
    min_confidence: f32,
    circle_radius: f32,
    paint: Paint,
    body_only: bool,
}

impl Default for SkeletonRenderer {
    fn default() -> Self {
        Self::new(0.5, 8.0)
    }
}

impl SkeletonRenderer {
    pub fn new(min_confidence: f32, circle_radius: f32) -> Self {
        Self {
            min_confidence,
            circle_radius,
            paint: Paint::default(),
            body_only: false,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            min_confidence: config.min_confidence,
            circle_radius: config.circle_radius,
            paint: Paint {
                color: config.color,
                stroke_width: config.stroke_width,
                text_size: config.text_size,
            },
            body_only: config.body_only,
        }
    }

    fn is_visible(&self, keypoint: &Keypoint) -> bool {
        keypoint.score > self.min_confidence
    }

    /// Bones whose endpoints both clear the confidence threshold.
    pub fn visible_bones<'a>(&'a self, pose: &'a Pose) -> impl Iterator<Item = BoneEdge> + 'a {
        BONES.iter().copied().filter(move |edge| {
            self.is_visible(pose.keypoint(edge.0)) && self.is_visible(pose.keypoint(edge.1))
        })
    }

    /// Render one frame: clear, blit `input` into the letterbox square, then
    /// draw the pose and its diagnostics.
    ///
    /// The caller holds the surface lock; this only draws.
    pub fn render<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        input: &Raster,
        pose: &Pose,
        transform: &RenderTransform,
    ) -> RenderSummary {
        canvas.clear();
        canvas.draw_raster(input, transform.dest_rect());
        self.draw_pose(canvas, pose, transform)
    }

    /// Still-image mode: draw `pose` straight over `raster`, which must be
    /// in model-input coordinates. Diagnostic text is not rasterised.
    pub fn annotate(&self, raster: &Raster, pose: &Pose) -> RgbaImage {
        let (width, height) = (raster.width(), raster.height());
        let mut surface = RasterSurface::new(width, height);
        surface.draw_raster(
            raster,
            Rect {
                left: 0,
                top: 0,
                width,
                height,
            },
        );
        self.draw_pose(&mut surface, pose, &RenderTransform::identity(width, height));
        surface.into_image()
    }

    fn draw_pose<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        pose: &Pose,
        transform: &RenderTransform,
    ) -> RenderSummary {
        let mut summary = RenderSummary::default();

        for keypoint in pose.keypoints() {
            if !self.is_visible(keypoint) || (self.body_only && keypoint.body_part.is_face()) {
                continue;
            }
            canvas.draw_circle(
                transform.map_point(keypoint.position),
                self.circle_radius,
                &self.paint,
            );
            summary.joints += 1;
        }

        for edge in self.visible_bones(pose) {
            canvas.draw_line(
                transform.map_point(pose.keypoint(edge.0).position),
                transform.map_point(pose.keypoint(edge.1).position),
                &self.paint,
            );
            summary.bones += 1;
        }

        let lines = [
            (SCORE_Y, format!("Score: {:.2}", pose.score())),
            (DEVICE_Y, format!("Device: {}", pose.device())),
            (
                TIME_Y,
                format!("Time: {:.2} ms", pose.inference_time().as_secs_f64() * 1000.0),
            ),
        ];
        for (y, text) in lines {
            // Text x ignores the letterbox offset; y does not.
            let (dx, dy) = transform.scale_offset(TEXT_X, y);
            canvas.draw_text(&text, (dx, dy + transform.top as f32), &self.paint);
        }

        summary
    }
}
