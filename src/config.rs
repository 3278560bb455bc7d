//! Governor configuration
//!
//! Loaded from TOML. Every section is optional and falls back to the
//! built-in level table:
//!
//! ```toml
//! [levels.standard]
//! loss_threshold = 2.0
//! debounce_ms = 5000
//! max_height = 360
//!
//! [notifications]
//! enabled = true
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::level::LevelTable;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    pub levels: LevelTable,
    pub notifications: NotificationConfig,
}

/// User notification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Emit "network unstable"/"network critical" notifications
    pub enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl GovernorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> std::result::Result<Self, ConfigError> {
        let config: GovernorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!("Loaded governor config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Platform config location, e.g. `~/.config/video-quality-governor/governor.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "conference", "video-quality-governor")
            .map(|dirs| dirs.config_dir().join("governor.toml"))
    }

    /// Load from the default path if present, otherwise use defaults
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.levels.validate()
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
