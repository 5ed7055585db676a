//! Dereverberation profile file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use wpe_core::config::{
    DEFAULT_FRAME_SIZE, DEFAULT_MIC_COUNT, DEFAULT_OUTPUT_COUNT, DEFAULT_OVERLAP,
};
use wpe_core::ndlp::{DEFAULT_DELAY, DEFAULT_ITERATIONS, DEFAULT_ORDER};
use wpe_core::{Window, WpeConfig};

/// Default output bit depth.
pub const DEFAULT_BIT_DEPTH: u16 = 16;

/// Default analysis window name.
pub const DEFAULT_WINDOW: &str = "hann";

/// A named set of dereverberation settings stored as TOML.
///
/// Every field has a default, so a profile file only needs the values it
/// changes.
///
/// # TOML Format
///
/// ```toml
/// name = "meeting-room"
/// description = "8-mic ceiling array"
/// mic_num = 8
/// out_num = 1
/// order = 20
/// delay = 2
/// iterations = 3
/// frame_size = 512
/// overlap = 0.5
/// window = "hann"
/// bit_depth = 24
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Profile {
    /// Name of the profile.
    pub name: String,

    /// Optional description of the profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Number of microphone channels read from the input.
    pub mic_num: usize,

    /// Number of dereverberated output channels.
    pub out_num: usize,

    /// Prediction order (taps per channel).
    pub order: usize,

    /// Prediction delay in frames.
    pub delay: usize,

    /// Variance re-estimation passes.
    pub iterations: usize,

    /// STFT frame size in samples.
    pub frame_size: usize,

    /// STFT overlap fraction.
    pub overlap: f64,

    /// Analysis window name.
    pub window: String,

    /// Optional floor on the residual power.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance_floor: Option<f64>,

    /// Output WAV bit depth (16, 24 or 32-bit float).
    pub bit_depth: u16,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new("default")
    }
}

impl Profile {
    /// Create a profile with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            mic_num: DEFAULT_MIC_COUNT,
            out_num: DEFAULT_OUTPUT_COUNT,
            order: DEFAULT_ORDER,
            delay: DEFAULT_DELAY,
            iterations: DEFAULT_ITERATIONS,
            frame_size: DEFAULT_FRAME_SIZE,
            overlap: DEFAULT_OVERLAP,
            window: DEFAULT_WINDOW.to_string(),
            variance_floor: None,
            bit_depth: DEFAULT_BIT_DEPTH,
        }
    }

    /// Create a profile with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Load a profile from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let profile: Profile = toml::from_str(&content)?;
        Ok(profile)
    }

    /// Load a profile from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the profile to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the profile to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Parsed analysis window.
    pub fn window(&self) -> Result<Window, ConfigError> {
        Window::from_name(&self.window)
            .ok_or_else(|| ConfigError::UnknownWindow(self.window.clone()))
    }

    /// Check every value without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_wpe_config().map(|_| ())
    }

    /// Dereverberator configuration described by this profile, validated.
    pub fn to_wpe_config(&self) -> Result<WpeConfig, ConfigError> {
        if !matches!(self.bit_depth, 16 | 24 | 32) {
            return Err(ConfigError::InvalidBitDepth(self.bit_depth));
        }

        let config = WpeConfig {
            mic_count: self.mic_num,
            output_count: self.out_num,
            order: self.order,
            delay: self.delay,
            iterations: self.iterations,
            frame_size: self.frame_size,
            overlap: self.overlap,
            window: self.window()?,
            variance_floor: self.variance_floor,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let profile = Profile::default();
        assert_eq!(profile.name, "default");
        assert_eq!(profile.mic_num, 3);
        assert_eq!(profile.out_num, 2);
        assert_eq!(profile.order, 30);
        assert_eq!(profile.iterations, 2);
        assert_eq!(profile.bit_depth, 16);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let profile = Profile::from_toml("name = \"lab\"\norder = 12\n").unwrap();
        assert_eq!(profile.name, "lab");
        assert_eq!(profile.order, 12);
        assert_eq!(profile.mic_num, 3);
        assert_eq!(profile.overlap, 0.5);
        assert_eq!(profile.window, "hann");
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut profile = Profile::new("array").with_description("ceiling array");
        profile.mic_num = 8;
        profile.out_num = 1;
        profile.variance_floor = Some(1e-8);

        let text = profile.to_toml().unwrap();
        assert!(text.contains("mic_num = 8"));
        assert_eq!(Profile::from_toml(&text).unwrap(), profile);
    }

    #[test]
    fn test_to_wpe_config() {
        let mut profile = Profile::new("p");
        profile.window = "periodic-hann".to_string();
        profile.frame_size = 256;

        let config = profile.to_wpe_config().unwrap();
        assert_eq!(config.window, Window::PeriodicHann);
        assert_eq!(config.frame_size, 256);
        assert_eq!(config.mic_count, 3);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut profile = Profile::default();
        profile.out_num = 5;
        assert!(matches!(profile.validate(), Err(ConfigError::Invalid(_))));

        let profile = Profile::from_toml("delay = 0").unwrap();
        assert!(matches!(profile.validate(), Err(ConfigError::Invalid(_))));

        let mut profile = Profile::default();
        profile.window = "triangle".to_string();
        assert!(matches!(profile.validate(), Err(ConfigError::UnknownWindow(_))));

        let mut profile = Profile::default();
        profile.bit_depth = 8;
        assert!(matches!(profile.validate(), Err(ConfigError::InvalidBitDepth(8))));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Profile::from_toml("order = \"many\""),
            Err(ConfigError::TomlParse(_))
        ));
    }
}
