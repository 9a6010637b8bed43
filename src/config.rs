//! # Configuration
//!
//! Engine settings read from `config.json` in the working directory. Every field is
//! optional; a missing file means all defaults.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file looked up by [`EngineConfig::load_or_default`].
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory the texture table is loaded from.
    pub assets_dir: PathBuf,
    /// Directory worlds are saved under, one subdirectory per world.
    pub saves_dir: PathBuf,
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub ticks_per_second: u32,
    /// Game sessions save every this many ticks.
    pub autosave_interval_ticks: u64,
    /// Player speed in tiles per tick before the tile's speed multiplier is applied.
    pub player_speed: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            saves_dir: PathBuf::from("saves"),
            window_title: "Tile Sandbox".to_string(),
            window_width: 640,
            window_height: 480,
            ticks_per_second: 60,
            autosave_interval_ticks: 3600,
            player_speed: 0.1,
        }
    }
}

impl EngineConfig {
    /// Reads the configuration at `path`, or returns the defaults if the file does not exist.
    ///
    /// # Errors
    /// * [`ConfigError::Io`] if the file exists but cannot be read
    /// * [`ConfigError::Parse`] if it is not valid JSON for this struct
    /// * [`ConfigError::Invalid`] if a value is out of range
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = match fs::read(path) {
            Ok(bytes) => {
                info!("Reading configuration from {}", path.display());
                serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                info!("No {} found, using the default configuration", path.display());
                Self::default()
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid("ticks_per_second must be positive".to_string()));
        }
        if self.autosave_interval_ticks == 0 {
            return Err(ConfigError::Invalid(
                "autosave_interval_ticks must be positive".to_string(),
            ));
        }
        if self.window_width == 0 || self.window_height == 0 {
            return Err(ConfigError::Invalid("window size must be positive".to_string()));
        }
        if !(self.player_speed.is_finite() && self.player_speed > 0.0) {
            return Err(ConfigError::Invalid("player_speed must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::load_or_default(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "ticks_per_second": 30, "saves_dir": "worlds" }"#).unwrap();

        let config = EngineConfig::load_or_default(&path).unwrap();
        assert_eq!(config.ticks_per_second, 30);
        assert_eq!(config.saves_dir, PathBuf::from("worlds"));
        assert_eq!(config.window_width, EngineConfig::default().window_width);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            EngineConfig::load_or_default(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{ "ticks_per_second": 0 }"#).unwrap();

        assert!(matches!(
            EngineConfig::load_or_default(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
