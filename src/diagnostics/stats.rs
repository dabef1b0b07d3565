use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects diagnostic statistics for one pose pipeline.
pub struct PipelineStats {
    rendered_count: u64,
    drop_count: u64,
    malformed_count: u64,
    render_skipped_count: u64,
    start_time: Instant,
    inference_us: u64,
    last_score: f32,
}

/// Snapshot of pipeline stats for serialisation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    pub fps: f64,
    pub rendered_count: u64,
    pub drop_count: u64,
    pub drop_rate: f64,
    pub malformed_count: u64,
    pub render_skipped_count: u64,
    pub inference_ms: f64,
    pub last_score: f32,
}

impl PipelineStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            rendered_count: 0,
            drop_count: 0,
            malformed_count: 0,
            render_skipped_count: 0,
            start_time: Instant::now(),
            inference_us: 0,
            last_score: 0.0,
        }
    }

    /// Record a frame that made it all the way to the display.
    pub fn record_rendered(&mut self, inference_time: Duration, score: f32) {
        self.rendered_count += 1;
        self.inference_us = inference_time.as_micros() as u64;
        self.last_score = score;
    }

    /// Record frames overwritten before the worker picked them up.
    pub fn record_drops(&mut self, count: u64) {
        self.drop_count += count;
    }

    pub fn record_malformed(&mut self) {
        self.malformed_count += 1;
    }

    /// Record a frame that was inferred but could not be drawn because the
    /// display surface was unavailable.
    pub fn record_render_skipped(&mut self, inference_time: Duration) {
        self.render_skipped_count += 1;
        self.inference_us = inference_time.as_micros() as u64;
    }

    pub fn rendered_count(&self) -> u64 {
        self.rendered_count
    }

    /// Rendered frames per second since creation or the last reset.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.rendered_count as f64 / elapsed
    }

    /// Drop rate as a percentage (0.0 - 100.0) of all delivered frames.
    pub fn drop_rate(&self) -> f64 {
        let total = self.rendered_count
            + self.drop_count
            + self.malformed_count
            + self.render_skipped_count;
        if total == 0 {
            return 0.0;
        }
        (self.drop_count as f64 / total as f64) * 100.0
    }

    /// Latest inference latency in milliseconds.
    pub fn inference_ms(&self) -> f64 {
        self.inference_us as f64 / 1000.0
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            fps: self.fps(),
            rendered_count: self.rendered_count,
            drop_count: self.drop_count,
            drop_rate: self.drop_rate(),
            malformed_count: self.malformed_count,
            render_skipped_count: self.render_skipped_count,
            inference_ms: self.inference_ms(),
            last_score: self.last_score,
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
