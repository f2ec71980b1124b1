//! Scanner configuration.
//!
//! Stream constraints are requested as ranges: the backend negotiates the
//! closest format to the ideal and rejects anything outside min..=max.

use super::{CapabilityHints, FacingHint};
use crate::decode::DecodeConfig;
use crate::preprocess::PreprocessConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// A min/ideal/max range for one stream dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionRange {
    /// Smallest acceptable value.
    pub min: u32,
    /// Value requested from the device.
    pub ideal: u32,
    /// Largest acceptable value.
    pub max: u32,
}

impl DimensionRange {
    /// Creates a range; callers keep `min <= ideal <= max`.
    pub const fn new(min: u32, ideal: u32, max: u32) -> Self {
        Self { min, ideal, max }
    }

    /// Returns true if `value` lies within min..=max.
    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    fn is_ordered(&self) -> bool {
        self.min > 0 && self.min <= self.ideal && self.ideal <= self.max
    }
}

/// Configuration for camera capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Exact device to open. Overrides `facing` when set.
    pub device_id: Option<String>,
    /// Preferred camera facing when no device id is given.
    pub facing: FacingHint,
    /// Requested frame width range in pixels.
    pub width: DimensionRange,
    /// Requested frame height range in pixels.
    pub height: DimensionRange,
    /// Lowest acceptable frame rate.
    pub min_fps: u32,
    /// Preferred frame rate.
    pub ideal_fps: u32,
    /// Frames to wait for during open before declaring the stream dead.
    pub warmup_frames: u32,
    /// Best-effort capability tuning applied after open.
    pub capabilities: CapabilityHints,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: None,
            facing: FacingHint::Back,
            width: DimensionRange::new(640, 1280, 1920),
            height: DimensionRange::new(480, 720, 1080),
            min_fps: 15,
            ideal_fps: 30,
            warmup_frames: 30,
            capabilities: CapabilityHints::default(),
        }
    }
}

impl CaptureConfig {
    /// Returns a copy targeting a specific device.
    pub fn for_device(&self, device_id: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(id) = device_id {
            config.device_id = Some(id.to_owned());
        }
        config
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.width.is_ordered() || !self.height.is_ordered() {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.min_fps == 0 || self.ideal_fps < self.min_fps || self.ideal_fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        if let Some(d) = self.capabilities.focus_distance {
            if !(0.0..=1.0).contains(&d) {
                return Err(ConfigError::InvalidFocusDistance(d));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height range out of order or zero.
    #[error("invalid frame dimensions (need 0 < min <= ideal <= max)")]
    InvalidDimensions,
    /// Frame-rate range out of order or out of bounds.
    #[error("invalid frame rate (need 1 <= min <= ideal <= 120 fps)")]
    InvalidFrameRate,
    /// Focus distance outside 0.0-1.0.
    #[error("focus distance {0} outside 0.0-1.0")]
    InvalidFocusDistance(f32),
    /// Preprocessing parameter out of range.
    #[error("invalid preprocessing parameters: {0}")]
    InvalidPreprocess(String),
    /// Zero tick period.
    #[error("scan interval must be non-zero")]
    InvalidInterval,
    /// No decode formats configured.
    #[error("decode format list is empty")]
    NoFormats,
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Stream constraints and capability hints.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Candidate derivation.
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    /// Decode engine formats and hints.
    #[serde(default)]
    pub decode: DecodeConfig,
    /// Scan loop timing.
    #[serde(default)]
    pub scan: ScanConfig,
    /// CLI output and metrics exporter.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scan loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Tick period in milliseconds.
    pub interval_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { interval_ms: 100 }
    }
}

impl ScanConfig {
    /// Tick period as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Print format, candidate kind and frame sequence with each detection.
    pub verbose: bool,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            metrics_port: 0,
        }
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.preprocess.validate()?;
        self.decode.validate()?;
        if self.scan.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = CaptureConfig::default();
        assert!(config.validate().is_ok());
        assert!(FileConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unordered_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = DimensionRange::new(1920, 1280, 640);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_frame_rate_bounds() {
        let mut config = CaptureConfig::default();
        config.ideal_fps = 10; // below min_fps
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFrameRate)
        ));
    }

    #[test]
    fn test_for_device_overrides_id() {
        let config = CaptureConfig::default();
        assert_eq!(config.for_device(Some("2")).device_id.as_deref(), Some("2"));
        assert_eq!(config.for_device(None).device_id, None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [capture]
            facing = "front"
            ideal_fps = 24

            [scan]
            interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.capture.facing, FacingHint::Front);
        assert_eq!(config.capture.ideal_fps, 24);
        assert_eq!(config.capture.min_fps, 15);
        assert_eq!(config.scan.interval(), Duration::from_millis(250));
        assert_eq!(config.preprocess, PreprocessConfig::default());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let result = FileConfig::from_toml("[scan]\ninterval_ms = 0\n");
        assert!(matches!(result, Err(ConfigError::InvalidInterval)));
    }

    #[test]
    fn test_defaults_round_trip_through_toml() {
        let text = toml::to_string(&FileConfig::default()).unwrap();
        let parsed = FileConfig::from_toml(&text).unwrap();

        assert_eq!(parsed.capture, CaptureConfig::default());
        assert_eq!(parsed.decode, DecodeConfig::default());
        assert_eq!(parsed.scan.interval_ms, 100);
    }

    #[test]
    fn test_environment_alias() {
        let config = FileConfig::from_toml("[capture]\nfacing = \"environment\"\n").unwrap();
        assert_eq!(config.capture.facing, FacingHint::Back);
    }
}
