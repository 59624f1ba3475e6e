//! Main NakshaConfig and loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::build::BuildSection;
use super::error::ConfigLoadError;
use super::output::OutputSection;
use super::store::StoreSection;

/// Default config file location, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "configs/naksha.toml";

/// Full Naksha configuration loaded from TOML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct NakshaConfig {
    /// Store settings
    #[serde(default)]
    pub store: StoreSection,

    /// Build settings
    #[serde(default)]
    pub build: BuildSection,

    /// Output settings
    #[serde(default)]
    pub output: OutputSection,
}

impl NakshaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from the default config path, falling back to built-in defaults
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigLoadError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        let b = &self.build;
        if !(b.resolution.is_finite() && b.resolution > 0.0) {
            return Err(ConfigLoadError::Invalid(format!(
                "build.resolution must be > 0, got {}",
                b.resolution
            )));
        }
        if !(b.padding_m.is_finite() && b.padding_m >= 0.0) {
            return Err(ConfigLoadError::Invalid(format!(
                "build.padding_m must be >= 0, got {}",
                b.padding_m
            )));
        }
        if b.stride == 0 {
            return Err(ConfigLoadError::Invalid(
                "build.stride must be >= 1".to_string(),
            ));
        }
        if b.max_cells == 0 {
            return Err(ConfigLoadError::Invalid(
                "build.max_cells must be > 0".to_string(),
            ));
        }
        if let Some([min, max]) = b.z_range
            && !(min <= max)
        {
            return Err(ConfigLoadError::Invalid(format!(
                "build.z_range min {} exceeds max {}",
                min, max
            )));
        }
        if self.output.image_name.is_empty() {
            return Err(ConfigLoadError::Invalid(
                "output.image_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
