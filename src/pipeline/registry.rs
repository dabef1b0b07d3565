use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use super::controller::PipelineController;
use super::error::{PipelineError, Result};
use super::slot::FrameSource;
use super::worker::Pipeline;
use crate::diagnostics::PipelineSnapshot;
use crate::overlay::DisplaySurface;
use crate::pose::InferenceEngine;
use crate::settings::{ConfigError, PipelineConfig};

/// Independent pose pipelines keyed by stream id, e.g. the two cameras of
/// a dual view. Each has its own worker, buffers, and engine.
pub struct PipelineRegistry {
    pipelines: Mutex<HashMap<String, Pipeline>>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self {
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// Start a pipeline for `stream_id`.
    pub fn start<S>(
        &self,
        stream_id: &str,
        config: PipelineConfig,
        engine: Box<dyn InferenceEngine>,
        source: Arc<dyn FrameSource>,
        surface: Arc<Mutex<S>>,
    ) -> Result<()>
    where
        S: DisplaySurface + 'static,
    {
        if stream_id.is_empty() {
            return Err(PipelineError::Config(ConfigError::Invalid(
                "stream id must not be empty".to_string(),
            )));
        }

        let mut pipelines = self.pipelines.lock();
        if pipelines.contains_key(stream_id) {
            return Err(PipelineError::AlreadyRunning(stream_id.to_string()));
        }
        let controller = PipelineController::new(stream_id, config, engine)?;
        let pipeline = Pipeline::start(controller, source, surface)?;
        pipelines.insert(stream_id.to_string(), pipeline);
        Ok(())
    }

    /// Stop and remove a pipeline. Idempotent.
    pub fn stop(&self, stream_id: &str) {
        let removed = self.pipelines.lock().remove(stream_id);
        if let Some(mut pipeline) = removed {
            pipeline.stop();
        }
    }

    /// Stop every pipeline.
    pub fn stop_all(&self) {
        let drained: Vec<Pipeline> = std::mem::take(&mut *self.pipelines.lock())
            .into_values()
            .collect();
        if !drained.is_empty() {
            info!("stopping {} pipeline(s)", drained.len());
        }
        for mut pipeline in drained {
            pipeline.stop();
        }
    }

    /// Forward a frame-available notification to a stream's worker.
    pub fn notify(&self, stream_id: &str) -> Result<()> {
        let pipelines = self.pipelines.lock();
        let pipeline = pipelines
            .get(stream_id)
            .ok_or_else(|| PipelineError::UnknownStream(stream_id.to_string()))?;
        pipeline.notify_frame_available();
        Ok(())
    }

    /// Get diagnostic stats for a stream.
    pub fn diagnostics(&self, stream_id: &str) -> Result<PipelineSnapshot> {
        let pipelines = self.pipelines.lock();
        let pipeline = pipelines
            .get(stream_id)
            .ok_or_else(|| PipelineError::UnknownStream(stream_id.to_string()))?;
        Ok(pipeline.snapshot())
    }

    /// The fatal error that halted a stream, if any.
    pub fn fatal_error(&self, stream_id: &str) -> Option<String> {
        self.pipelines.lock().get(stream_id)?.fatal_error()
    }

    /// Ids of all registered streams, sorted.
    pub fn stream_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pipelines.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PipelineRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::dummy::{solid_frame, DummyEngine};
    use crate::overlay::RasterSurface;
    use crate::pipeline::slot::LatestFrameSlot;

    struct Stream {
        slot: Arc<LatestFrameSlot>,
        surface: Arc<Mutex<RasterSurface>>,
    }

    fn start_stream(registry: &PipelineRegistry, id: &str, width: u32, height: u32) -> Stream {
        let slot = Arc::new(LatestFrameSlot::new());
        let surface = Arc::new(Mutex::new(RasterSurface::new(width, height)));
        registry
            .start(
                id,
                PipelineConfig::default(),
                Box::new(DummyEngine::new()),
                Arc::clone(&slot) as Arc<dyn FrameSource>,
                Arc::clone(&surface),
            )
            .unwrap();
        Stream { slot, surface }
    }

    fn wait_for_posts(surface: &Mutex<RasterSurface>, count: u64) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if surface.lock().posted_frames() >= count {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn dual_view_streams_run_independently() {
        let registry = PipelineRegistry::new();
        let front = start_stream(&registry, "front", 480, 640);
        let back = start_stream(&registry, "back", 640, 480);
        assert_eq!(registry.stream_ids(), vec!["back", "front"]);

        front.slot.push(solid_frame(64, 48, (128, 128, 128), 1));
        registry.notify("front").unwrap();
        assert!(wait_for_posts(&front.surface, 1));

        assert_eq!(registry.diagnostics("front").unwrap().rendered_count, 1);
        assert_eq!(registry.diagnostics("back").unwrap().rendered_count, 0);
        assert_eq!(back.surface.lock().posted_frames(), 0);
        registry.stop_all();
        assert!(registry.stream_ids().is_empty());
    }

    #[test]
    fn duplicate_stream_is_rejected() {
        let registry = PipelineRegistry::new();
        let _stream = start_stream(&registry, "front", 4, 4);
        let result = registry.start(
            "front",
            PipelineConfig::default(),
            Box::new(DummyEngine::new()),
            Arc::new(LatestFrameSlot::new()),
            Arc::new(Mutex::new(RasterSurface::new(4, 4))),
        );
        assert!(matches!(result, Err(PipelineError::AlreadyRunning(_))));
    }

    #[test]
    fn unknown_stream_is_reported() {
        let registry = PipelineRegistry::new();
        assert!(matches!(
            registry.notify("missing"),
            Err(PipelineError::UnknownStream(_))
        ));
        assert!(registry.diagnostics("missing").is_err());
        assert!(registry.fatal_error("missing").is_none());
    }

    #[test]
    fn stop_is_idempotent() {
        let registry = PipelineRegistry::new();
        let _stream = start_stream(&registry, "front", 4, 4);
        registry.stop("front");
        registry.stop("front");
        assert!(registry.notify("front").is_err());
    }

    #[test]
    fn invalid_config_does_not_register() {
        let registry = PipelineRegistry::new();
        let result = registry.start(
            "front",
            PipelineConfig {
                min_confidence: 2.0,
                ..Default::default()
            },
            Box::new(DummyEngine::new()),
            Arc::new(LatestFrameSlot::new()),
            Arc::new(Mutex::new(RasterSurface::new(4, 4))),
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
        assert!(registry.stream_ids().is_empty());
    }
}
