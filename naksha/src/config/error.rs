//! Configuration loading errors.

use thiserror::Error;

/// Config load error
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid value: {0}")]
    Invalid(String),
}
