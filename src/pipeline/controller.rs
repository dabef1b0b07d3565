use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::error::Result;
use super::slot::FrameSource;
use super::state::PipelineState;
use crate::diagnostics::PipelineStats;
use crate::frame::convert::convert_yuv420_into;
use crate::frame::crop::crop_to_aspect;
use crate::frame::scale::Scaler;
use crate::frame::{Raster, RawFrame};
use crate::overlay::{DisplaySurface, RenderSummary, RenderTransform, SkeletonRenderer, SurfaceLock};
use crate::pose::{InferenceEngine, Pose};
use crate::settings::PipelineConfig;

/// Result of one pass through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No new frame was available; nothing happened.
    NoFrame,
    /// The frame was drawn and posted.
    Rendered(RenderSummary),
    /// The frame was inferred but the display surface was unavailable.
    RenderSkipped,
}

/// Runs one frame at a time from sensor frame to rendered overlay.
///
/// Owns every buffer the stages need plus its own inference engine, so
/// independent controllers share nothing.
pub struct PipelineController {
    stream_id: String,
    config: PipelineConfig,
    engine: Box<dyn InferenceEngine>,
    scaler: Scaler,
    renderer: SkeletonRenderer,
    /// Full-frame ARGB, then the aspect-cropped view of it.
    argb: Raster,
    /// Model-sized input handed to the engine.
    model_input: Raster,
    state: PipelineState,
    stats: Arc<Mutex<PipelineStats>>,
}

impl PipelineController {
    pub fn new(
        stream_id: impl Into<String>,
        config: PipelineConfig,
        engine: Box<dyn InferenceEngine>,
    ) -> Result<Self> {
        config.validate()?;
        let model_input = Raster::filled(config.model_width, config.model_height, 0);
        Ok(Self {
            stream_id: stream_id.into(),
            renderer: SkeletonRenderer::from_config(&config),
            config,
            engine,
            scaler: Scaler::new(),
            argb: Raster::default(),
            model_input,
            state: PipelineState::Idle,
            stats: Arc::new(Mutex::new(PipelineStats::new())),
        })
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Shared handle to this pipeline's statistics.
    pub fn stats(&self) -> Arc<Mutex<PipelineStats>> {
        Arc::clone(&self.stats)
    }


    /// Process the newest available frame end to end.
    ///
    /// Returns `NoFrame` when the source has nothing new. An
    /// [`EngineClosed`](super::error::PipelineError::EngineClosed) error is
    /// fatal; other errors only affect the current frame.
    pub fn process_next_frame<S: DisplaySurface + ?Sized>(
        &mut self,
        source: &dyn FrameSource,
        surface: &mut S,
    ) -> Result<FrameOutcome> {
        match self.infer_next(source)? {
            Some(pose) => Ok(self.render(&pose, surface)),
            None => Ok(FrameOutcome::NoFrame),
        }
    }

    /// Run the stages up to and including inference.
    ///
    /// On success with a pose the controller is left in `Inferred` and
    /// [`PipelineController::render`] must follow.
    pub(crate) fn infer_next(&mut self, source: &dyn FrameSource) -> Result<Option<Pose>> {
        if self.config.preview_disabled() {
            return Ok(None);
        }

        let dropped = source.take_dropped();
        if dropped > 0 {
            trace!("[{}] {dropped} frame(s) replaced before pickup", self.stream_id);
            self.stats.lock().record_drops(dropped);
        }

        let Some(frame) = source.acquire_latest() else {
            return Ok(None);
        };
        self.advance(PipelineState::FrameAcquired);

        let result = self.run_stages(&frame);
        if result.is_err() {
            self.state = PipelineState::Idle;
        }
        result.map(Some)
    }

    fn run_stages(&mut self, frame: &RawFrame) -> Result<Pose> {
        if let Err(e) = convert_yuv420_into(frame, &mut self.argb) {
            self.stats.lock().record_malformed();
            return Err(e.into());
        }
        self.advance(PipelineState::Converted);

        let (model_width, model_height) = (self.config.model_width, self.config.model_height);
        let full = std::mem::take(&mut self.argb);
        self.argb = crop_to_aspect(full, model_width, model_height);
        self.advance(PipelineState::Cropped);

        self.scaler.scale_into(&self.argb, &mut self.model_input)?;
        self.advance(PipelineState::Scaled);

        let pose = self.engine.estimate_single_pose(&self.model_input)?;
        self.advance(PipelineState::Inferred);
        Ok(pose)
    }

    /// Draw `pose` over the current model input and post it.
    ///
    /// Surface lock or post failures skip this frame only. Without a
    /// preceding inference there is nothing to draw and the surface is not
    /// touched.
    pub(crate) fn render<S: DisplaySurface + ?Sized>(
        &mut self,
        pose: &Pose,
        surface: &mut S,
    ) -> FrameOutcome {
        if self.state != PipelineState::Inferred {
            warn!("[{}] render requested in state {}", self.stream_id, self.state);
            return FrameOutcome::RenderSkipped;
        }

        let outcome = match SurfaceLock::acquire(surface) {
            Ok(mut canvas) => {
                let (width, height) = canvas.size();
                let transform = RenderTransform::fit(
                    width,
                    height,
                    self.config.model_width,
                    self.config.model_height,
                );
                let summary = self
                    .renderer
                    .render(&mut *canvas, &self.model_input, pose, &transform);
                match canvas.post() {
                    Ok(()) => FrameOutcome::Rendered(summary),
                    Err(e) => {
                        warn!("[{}] failed to post overlay: {e}", self.stream_id);
                        FrameOutcome::RenderSkipped
                    }
                }
            }
            Err(e) => {
                warn!("[{}] skipping render: {e}", self.stream_id);
                FrameOutcome::RenderSkipped
            }
        };

        let latency = self.engine.last_inference_time();
        match outcome {
            FrameOutcome::Rendered(_) => {
                self.advance(PipelineState::Rendered);
                self.stats.lock().record_rendered(latency, pose.score());
                self.advance(PipelineState::Idle);
            }
            _ => {
                self.stats.lock().record_render_skipped(latency);
                self.state = PipelineState::Idle;
            }
        }
        outcome
    }

    /// Close the inference engine. Further frames fail with
    /// [`EngineClosed`](super::error::PipelineError::EngineClosed).
    pub fn close_engine(&mut self) {
        debug!("[{}] closing {} inference engine", self.stream_id, self.engine.device());
        self.engine.close();
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert_eq!(
            self.state.next(),
            next,
            "pipeline stages must run in order"
        );
        trace!("[{}] {} -> {next}", self.stream_id, self.state);
        self.state = next;
    }
}
