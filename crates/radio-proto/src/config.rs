use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub echonest: EchoNestConfig,
    #[serde(default)]
    pub radio: RadioConfig,
}

/// How to reach the playback daemon's command client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Binary name or path of the command client.
    #[serde(default = "default_player_command")]
    pub command: String,
    /// Leading arguments passed before every command, e.g. when the client
    /// is reached through a wrapper such as `ssh host sc`.
    #[serde(default)]
    pub args: Vec<String>,
    /// Upper bound on consecutive `qprint` re-issues at startup.
    #[serde(default = "default_print_mode_max_attempts")]
    pub print_mode_max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EchoNestConfig {
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Total attempts for track fetches and feedback calls (1 = no retry).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Queue depth at or above which the refill loop stays idle.
    #[serde(default = "default_high_water_mark")]
    pub high_water_mark: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: Vec::new(),
            print_mode_max_attempts: default_print_mode_max_attempts(),
        }
    }
}

impl Default for EchoNestConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            high_water_mark: default_high_water_mark(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_player_command() -> String {
    "sc".to_string()
}

fn default_print_mode_max_attempts() -> u32 {
    8
}

fn default_api_key() -> String {
    "TANPJV5OAIXMBC5TR".to_string()
}

fn default_base_url() -> String {
    "http://developer.echonest.com/api/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> u32 {
    4
}

fn default_retry_base_ms() -> u64 {
    500
}

fn default_retry_max_ms() -> u64 {
    8000
}

fn default_high_water_mark() -> usize {
    3
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Config {
    /// Load from the default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            debug!("config: {} missing, writing defaults", config_path.display());
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            echonest: EchoNestConfig::default(),
            radio: RadioConfig::default(),
        }
    }
}
