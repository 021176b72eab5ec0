//! Configuration file support for Rhythm.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/rhythm/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub home: HomeConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Playback timer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// How often the player ticks while running
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Home screen configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Sessions considered "recent" for mood and message selection
    #[serde(default = "default_recent_sessions")]
    pub recent_sessions: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            recent_sessions: default_recent_sessions(),
        }
    }
}

/// History summary configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Length of the rolling window summarized by `rhythm history`
    #[serde(default = "default_summary_days")]
    pub summary_days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            summary_days: default_summary_days(),
        }
    }
}

// Default value functions
fn home_dir_or_current() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir_or_current().join(".local/share"));
    base.join("rhythm")
}

fn default_tick_interval_ms() -> u64 {
    500
}

fn default_recent_sessions() -> usize {
    3
}

fn default_summary_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the player and selectors cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.player.tick_interval_ms == 0 {
            return Err(Error::Config("player.tick_interval_ms must be positive".into()));
        }
        if self.history.summary_days <= 0 {
            return Err(Error::Config("history.summary_days must be positive".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir_or_current().join(".config"));
        base.join("rhythm").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.player.tick_interval_ms, 500);
        assert_eq!(config.home.recent_sessions, 3);
        assert_eq!(config.history.summary_days, 7);
        assert!(config.data.data_dir.ends_with("rhythm"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("rhythm").join("config.toml");

        let mut config = Config::default();
        config.player.tick_interval_ms = 250;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.player.tick_interval_ms, 250);
        assert_eq!(loaded.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[home]
recent_sessions = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.home.recent_sessions, 5);
        assert_eq!(config.player.tick_interval_ms, 500); // default
    }

    #[test]
    fn test_invalid_values_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[player]\ntick_interval_ms = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
