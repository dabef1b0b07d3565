use thiserror::Error;

use crate::frame::error::FrameError;
use crate::pose::InferenceError;
use crate::settings::ConfigError;

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("frame rejected: {0}")]
    Frame(#[from] FrameError),

    /// The inference engine was shut down under a running pipeline.
    #[error("inference engine was shut down")]
    EngineClosed,

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("stream already running: {0}")]
    AlreadyRunning(String),

    #[error("no pipeline for stream: {0}")]
    UnknownStream(String),

    #[error("invalid pipeline config: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to spawn pipeline worker: {0}")]
    Spawn(#[from] std::io::Error),
}

impl PipelineError {
    /// True if the pipeline cannot process any further frames.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EngineClosed)
    }
}

impl From<InferenceError> for PipelineError {
    fn from(e: InferenceError) -> Self {
        match e {
            InferenceError::Closed => Self::EngineClosed,
            InferenceError::Failed(msg) => Self::Inference(msg),
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, PipelineError>;
