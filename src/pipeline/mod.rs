// Pipeline — per-stream frame processing, worker threads, and drop-oldest intake.

pub mod controller;
pub mod error;
pub mod registry;
pub mod slot;
pub mod state;
pub mod worker;

pub use controller::{FrameOutcome, PipelineController};
pub use error::PipelineError;
pub use registry::PipelineRegistry;
pub use slot::{FrameSource, LatestFrameSlot};
pub use state::PipelineState;
pub use worker::Pipeline;
