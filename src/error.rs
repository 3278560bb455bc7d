//! Error types for the quality governor
//!
//! The control path itself never fails; these cover configuration,
//! session sinks and input parsing at the crate's edges.

use thiserror::Error;

use crate::level::QualityLevel;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid loss threshold for {level}: {value}")]
    InvalidThreshold { level: QualityLevel, value: f64 },

    #[error("Loss threshold of {lower} must be below {higher}")]
    ThresholdOrder {
        lower: QualityLevel,
        higher: QualityLevel,
    },

    #[error("Debounce window for {0} must be non-zero")]
    ZeroDebounce(QualityLevel),

    #[error("Max height {max_height} for {level}: only critical may be audio-only (0)")]
    AudioOnlyMismatch { level: QualityLevel, max_height: u32 },
}

/// Conference session sink errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Receiver constraint rejected: {0}")]
    ConstraintRejected(String),
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;
