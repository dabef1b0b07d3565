use std::time::{Duration, Instant};

use crate::frame::{Plane, Raster, RawFrame};
use crate::pose::engine::Result;
use crate::pose::{BodyPart, InferenceEngine, InferenceError, Pose, Position};

/// Alignment padding added to every simulated plane row.
const ROW_PADDING: usize = 16;

/// Standing figure in normalised model coordinates with per-part scores.
/// Ankles sit below the default threshold so the lower legs stay hidden.
const STANDING_POSE: [(f32, f32, f32); 17] = [
    (0.50, 0.14, 0.95), // nose
    (0.47, 0.12, 0.90),
    (0.53, 0.12, 0.90),
    (0.44, 0.13, 0.70),
    (0.56, 0.13, 0.70),
    (0.38, 0.26, 0.90), // shoulders
    (0.62, 0.26, 0.90),
    (0.33, 0.42, 0.85), // elbows
    (0.67, 0.42, 0.85),
    (0.31, 0.56, 0.65), // wrists
    (0.69, 0.56, 0.65),
    (0.42, 0.58, 0.90), // hips
    (0.58, 0.58, 0.90),
    (0.41, 0.76, 0.75), // knees
    (0.59, 0.76, 0.75),
    (0.40, 0.93, 0.35), // ankles
    (0.60, 0.93, 0.35),
];

/// Build a planar YUV 4:2:0 frame with one colour everywhere.
///
/// Rows carry alignment padding, like real camera buffers.
pub fn solid_frame(width: u32, height: u32, yuv: (u8, u8, u8), timestamp_us: u64) -> RawFrame {
    let (w, h) = (width as usize, height as usize);
    let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
    let plane = |value: u8, cols: usize, rows: usize| {
        let stride = cols + ROW_PADDING;
        Plane::new(vec![value; stride * rows], stride, 1)
    };
    RawFrame {
        width,
        height,
        y: plane(yuv.0, w, h),
        u: plane(yuv.1, cw, ch),
        v: plane(yuv.2, cw, ch),
        timestamp_us,
    }
}

/// Build a moving test pattern: diagonal luma bands that shift with `index`
/// over a slowly rotating chroma tint. Chroma is semi-planar (interleaved
/// U/V with pixel stride 2), as many camera HALs deliver it.
pub fn test_pattern_frame(width: u32, height: u32, index: u64) -> RawFrame {
    let (w, h) = (width as usize, height as usize);
    let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
    let shift = (index * 4) as usize;

    let y_stride = w + ROW_PADDING;
    let mut y = vec![0u8; y_stride * h];
    for row in 0..h {
        for col in 0..w {
            let band = ((row + col + shift) / 32) % 2;
            y[row * y_stride + col] = if band == 0 { 60 } else { 180 };
        }
    }

    let uv_stride = cw * 2 + ROW_PADDING;
    let mut uv = vec![128u8; uv_stride * ch];
    let tint = (index % 64) as u8;
    for row in 0..ch {
        for col in 0..cw {
            uv[row * uv_stride + col * 2] = 96 + tint;
            uv[row * uv_stride + col * 2 + 1] = 160 - tint;
        }
    }
    // V starts one byte into the interleaved buffer; pad it back to full
    // length so both views cover `row_stride * rows`.
    let mut v = uv[1..].to_vec();
    v.push(128);

    RawFrame {
        width,
        height,
        y: Plane::new(y, y_stride, 1),
        u: Plane::new(uv, uv_stride, 2),
        v: Plane::new(v, uv_stride, 2),
        timestamp_us: index * 33_333,
    }
}

/// A stand-in inference engine for running without a model.
///
/// Returns a fixed standing pose that sways a little from call to call, and
/// optionally sleeps to simulate model latency.
pub struct DummyEngine {
    device: String,
    latency: Duration,
    last: Duration,
    calls: u64,
    closed: bool,
}

impl DummyEngine {
    pub fn new() -> Self {
        Self {
            device: "CPU".to_string(),
            latency: Duration::ZERO,
            last: Duration::ZERO,
            calls: 0,
            closed: false,
        }
    }

    /// Block each inference call for `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Number of completed inference calls.
    pub fn calls(&self) -> u64 {
        self.calls
    }
}

impl Default for DummyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceEngine for DummyEngine {
    fn estimate_single_pose(&mut self, input: &Raster) -> Result<Pose> {
        if self.closed {
            return Err(InferenceError::Closed);
        }
        if input.width() == 0 || input.height() == 0 {
            return Err(InferenceError::Failed("empty model input".to_string()));
        }

        let started = Instant::now();
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        let (w, h) = (input.width() as f32, input.height() as f32);
        let sway = ((self.calls % 20) as f32 - 10.0).abs() / 10.0 * 0.04 - 0.02;
        let score =
            STANDING_POSE.iter().map(|p| p.2).sum::<f32>() / STANDING_POSE.len() as f32;

        self.calls += 1;
        self.last = started.elapsed();
        Ok(Pose::from_fn(score, self.device.as_str(), self.last, |part| {
            let (x, y, score) = STANDING_POSE[part.index()];
            // Upper body sways, feet stay planted.
            let dx = if part.index() < BodyPart::LeftHip.index() {
                sway
            } else {
                0.0
            };
            (Position::new((x + dx) * w, y * h), score)
        }))
    }

    fn device(&self) -> &str {
        &self.device
    }

    fn last_inference_time(&self) -> Duration {
        self.last
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
