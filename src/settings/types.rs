use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Per-pipeline options. Every field has a default, so a partial JSON
/// object is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Keypoints and bones are drawn only when their score exceeds this.
    pub min_confidence: f32,
    /// Joint marker radius in display pixels.
    pub circle_radius: f32,
    pub model_width: u32,
    pub model_height: u32,
    /// Capture size requested from the frame source. Zero disables the
    /// pipeline without error.
    pub preview_width: u32,
    pub preview_height: u32,
    pub stroke_width: f32,
    pub text_size: f32,
    /// Overlay colour as packed ARGB.
    pub color: u32,
    /// Skip head keypoint markers (nose, eyes, ears).
    pub body_only: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            circle_radius: 8.0,
            model_width: 257,
            model_height: 257,
            preview_width: 640,
            preview_height: 480,
            stroke_width: 8.0,
            text_size: 60.0,
            color: 0xFFFF_FF00,
            body_only: false,
        }
    }
}

impl PipelineConfig {
    /// True when either preview dimension is zero; such a pipeline never
    /// processes frames.
    pub fn preview_disabled(&self) -> bool {
        self.preview_width == 0 || self.preview_height == 0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "minConfidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        if !self.circle_radius.is_finite() || self.circle_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "circleRadius must be positive, got {}",
                self.circle_radius
            )));
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "strokeWidth must be positive, got {}",
                self.stroke_width
            )));
        }
        if self.model_width == 0 || self.model_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "model size must be non-zero, got {}x{}",
                self.model_width, self.model_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.circle_radius, 8.0);
        assert_eq!((config.model_width, config.model_height), (257, 257));
        assert_eq!((config.preview_width, config.preview_height), (640, 480));
        assert!(!config.body_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let json = serde_json::to_value(PipelineConfig::default()).unwrap();
        assert_eq!(json["minConfidence"], 0.5);
        assert_eq!(json["modelWidth"], 257);
        assert_eq!(json["previewHeight"], 480);
        assert_eq!(json["bodyOnly"], false);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"minConfidence": 0.3, "bodyOnly": true}"#).unwrap();
        assert_eq!(config.min_confidence, 0.3);
        assert!(config.body_only);
        assert_eq!(config.circle_radius, 8.0);
        assert_eq!(config.model_width, 257);
    }

    #[test]
    fn validate_rejects_threshold_out_of_range() {
        let config = PipelineConfig {
            min_confidence: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_nan_radius() {
        let config = PipelineConfig {
            circle_radius: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_model_size() {
        let config = PipelineConfig {
            model_height: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("model size"));
    }

    #[test]
    fn zero_preview_is_valid_but_disabled() {
        let config = PipelineConfig {
            preview_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert!(config.preview_disabled());
        assert!(!PipelineConfig::default().preview_disabled());
    }
}
