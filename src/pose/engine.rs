use std::time::Duration;

use thiserror::Error;

use super::types::Pose;
use crate::frame::Raster;

/// Inference engine errors.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The engine was shut down; no further calls will succeed.
    #[error("inference engine is closed")]
    Closed,

    #[error("inference failed: {0}")]
    Failed(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Single-pose estimation model.
///
/// The model itself is opaque; implementations wrap whatever runtime executes
/// it. An engine instance belongs to exactly one pipeline and is only ever
/// called from that pipeline's worker thread, hence `Send` but not `Sync`.
pub trait InferenceEngine: Send {
    /// Run the model on a raster of exactly the model input size and block
    /// until the pose is ready.
    fn estimate_single_pose(&mut self, input: &Raster) -> Result<Pose>;

    /// Label of the device the model runs on, shown in the overlay.
    fn device(&self) -> &str;

    /// Wall time of the most recent `estimate_single_pose` call.
    fn last_inference_time(&self) -> Duration;

    /// Release model resources. Later estimates must fail with
    /// [`InferenceError::Closed`]. Calling `close` twice is harmless.
    fn close(&mut self);
}
