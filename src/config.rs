//=========================================================================
// Arcade Configuration
//=========================================================================
//
// TOML-backed runtime configuration.
//
// Layout:
//   [engine]       tick rate, channel capacity, window
//   [storage]      data directory, backend, debounce profile, cache TTL
//   [leaderboard]  remote endpoint, timeout, retry policy
//   [game]         player name, locale, RNG seed
//
// Every field has a default, so an empty file (or no file) is valid.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::storage::DebounceProfile;

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

//=== Sections ============================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tps: f64,
    pub channel_capacity: usize,
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tps: 60.0,
            channel_capacity: 128,
            window_title: "Woodcat Arcade - Tank Battle".to_string(),
            window_width: 800,
            window_height: 600,
        }
    }
}

/// Where saved data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Parent directory of the `WoodcatGameDB` database directory.
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    pub debounce: DebounceProfile,
    pub cache_ttl_secs: u64,
}

impl StorageConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            backend: BackendKind::File,
            debounce: DebounceProfile::Desktop,
            cache_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl LeaderboardConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            timeout_ms: 5_000,
            max_retries: 3,
            retry_delay_ms: 1_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub player_name: String,
    pub locale: String,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            locale: "en".to_string(),
            seed: None,
        }
    }
}

//=== ArcadeConfig ========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArcadeConfig {
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub leaderboard: LeaderboardConfig,
    pub game: GameConfig,
}

impl ArcadeConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&text)?;
        info!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.tps.is_nan() || self.engine.tps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "engine.tps must be positive, got {}",
                self.engine.tps
            )));
        }
        if self.engine.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "engine.channel_capacity must be positive".to_string(),
            ));
        }
        if self.leaderboard.enabled && self.leaderboard.base_url.is_empty() {
            return Err(ConfigError::Invalid(
                "leaderboard.base_url is required when the leaderboard is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_uses_defaults() {
        let config = ArcadeConfig::from_toml_str("").unwrap();
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(config.storage.cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = ArcadeConfig::from_toml_str(
            r#"
            [engine]
            tps = 30.0

            [storage]
            backend = "memory"
            debounce = "mobile"

            [game]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.engine.tps, 30.0);
        assert_eq!(config.engine.channel_capacity, 128);
        assert_eq!(config.storage.backend, BackendKind::Memory);
        assert_eq!(config.storage.debounce, DebounceProfile::Mobile);
        assert_eq!(config.game.seed, Some(7));
        assert_eq!(config.game.player_name, "Player");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ArcadeConfig::from_toml_str("[engine]\ntps = 0.0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = ArcadeConfig::from_toml_str("[leaderboard]\nenabled = true").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ArcadeConfig::from_toml_str("[engine\ntps = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[game]\nplayer_name = \"Ada\"").unwrap();

        let config = ArcadeConfig::load(file.path()).unwrap();
        assert_eq!(config.game.player_name, "Ada");

        let err = ArcadeConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
