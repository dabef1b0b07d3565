// Settings — pipeline configuration and its JSON persistence.

pub mod store;
pub mod types;

pub use store::SettingsStore;
pub use types::{ConfigError, PipelineConfig};
