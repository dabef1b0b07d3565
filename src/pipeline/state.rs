use serde::Serialize;
use std::fmt;

/// Per-frame progress of a [`PipelineController`](super::controller::PipelineController).
///
/// Every frame walks the full cycle in order and ends back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineState {
    #[default]
    Idle,
    FrameAcquired,
    Converted,
    Cropped,
    Scaled,
    Inferred,
    Rendered,
}

impl PipelineState {
    /// The only state this one may advance to.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::FrameAcquired,
            Self::FrameAcquired => Self::Converted,
            Self::Converted => Self::Cropped,
            Self::Cropped => Self::Scaled,
            Self::Scaled => Self::Inferred,
            Self::Inferred => Self::Rendered,
            Self::Rendered => Self::Idle,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FrameAcquired => "frame-acquired",
            Self::Converted => "converted",
            Self::Cropped => "cropped",
            Self::Scaled => "scaled",
            Self::Inferred => "inferred",
            Self::Rendered => "rendered",
        };
        f.write_str(name)
    }
}
