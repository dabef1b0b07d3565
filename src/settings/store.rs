use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::settings::types::{ConfigError, PipelineConfig};

/// Persistent pipeline configuration backed by a JSON file.
pub struct SettingsStore {
    path: PathBuf,
    data: Mutex<PipelineConfig>,
}

impl SettingsStore {
    /// Open the store at `path`, loading the file if it exists.
    pub fn open(path: PathBuf) -> Result<Self, ConfigError> {
        let data = Self::load(&path)?;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    /// Load and validate a config file, returning defaults on a missing file.
    pub fn load(path: &Path) -> Result<PipelineConfig, ConfigError> {
        if !path.exists() {
            debug!("no settings at {}, using defaults", path.display());
            return Ok(PipelineConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Current configuration.
    pub fn config(&self) -> PipelineConfig {
        self.data.lock().clone()
    }

    /// Replace the configuration after validating it. Not persisted until
    /// [`SettingsStore::save`].
    pub fn set(&self, config: PipelineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.data.lock() = config;
        Ok(())
    }

    /// Save to disk atomically (write .tmp then rename).
    pub fn save(&self) -> Result<(), ConfigError> {
        let data = self.data.lock().clone();
        let json = serde_json::to_string_pretty(&data)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}
