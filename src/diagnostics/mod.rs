// Diagnostics — per-pipeline counters and serialisable snapshots.

pub mod stats;

pub use stats::{PipelineSnapshot, PipelineStats};
