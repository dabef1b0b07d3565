use thiserror::Error;

/// Frame preparation errors.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("resize failed: {0}")]
    Resize(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, FrameError>;
