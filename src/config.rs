//! Profile session configuration
//!
//! Read from the `[profile]` table of a TOML file, with environment overrides:
//!
//! ```toml
//! [profile]
//! enabled = true
//! initial_capacity = 4096
//! ```

use crate::error::{ProfileError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings applied when a session is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Start the session enabled
    pub enabled: bool,
    /// Datapoints to reserve room for up front
    pub initial_capacity: usize,
}

impl ProfileConfig {
    /// Environment variable that overrides `enabled`
    pub const ENABLED_ENV: &'static str = "SCRIPTPROF_ENABLED";

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid TOML.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read profile config: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text; a missing `[profile]` table means defaults
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        #[derive(Deserialize)]
        struct ConfigFile {
            #[serde(default)]
            profile: ProfileConfig,
        }

        let file: ConfigFile =
            toml::from_str(content).context("Failed to parse TOML profile config")?;
        Ok(file.profile)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `SCRIPTPROF_ENABLED` on top of this configuration
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var(Self::ENABLED_ENV) {
            self.enabled = parse_flag(&value).ok_or_else(|| {
                ProfileError::Config(format!("{}={}", Self::ENABLED_ENV, value))
            })?;
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
