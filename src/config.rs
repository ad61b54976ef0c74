//! Configuration for jukeboxd
//!
//! An optional TOML file provides the base configuration; command-line
//! flags (see `main.rs`) override individual fields. Built-in defaults
//! cover everything, so the daemon starts with no file at all.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Redis server URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// List key holding pending queue items
    #[serde(default = "default_queue_key")]
    pub queue_key: String,

    /// Pub/sub channel carrying commands and status events
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Status key names in the shared store
    #[serde(default)]
    pub keys: StoreKeys,

    /// Media backend settings
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Status key names in the shared store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreKeys {
    /// Current track (JSON payload), set on play, cleared on end
    #[serde(default = "default_current_key")]
    pub current: String,

    /// RFC 3339 instant the current track started
    #[serde(default = "default_start_time_key")]
    pub start_time: String,

    /// Elapsed active-play seconds, present only while playing
    #[serde(default = "default_elapsed_key")]
    pub elapsed: String,

    /// RFC 3339 instant the current pause began
    #[serde(default = "default_pause_time_key")]
    pub pause_time: String,

    /// Total paused milliseconds for the current track
    #[serde(default = "default_pause_duration_key")]
    pub pause_duration: String,
}

/// Media backend settings.
///
/// Credentials are constructor inputs for the real streaming stack; the
/// simulated backend ignores them.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub pass: Option<String>,

    /// Path to the backend application key file
    #[serde(default)]
    pub key_path: Option<String>,

    /// Simulated track length in seconds
    #[serde(default = "default_sim_track_seconds")]
    pub sim_track_seconds: u64,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_queue_key() -> String {
    "fm:player:queue".to_string()
}

fn default_channel() -> String {
    "fm:events".to_string()
}

fn default_current_key() -> String {
    "fm:player:current".to_string()
}

fn default_start_time_key() -> String {
    "fm:player:start_time".to_string()
}

fn default_elapsed_key() -> String {
    "fm:player:elapsed_time".to_string()
}

fn default_pause_time_key() -> String {
    "fm:player:pause_time".to_string()
}

fn default_pause_duration_key() -> String {
    "fm:player:pause_duration".to_string()
}

fn default_sim_track_seconds() -> u64 {
    180
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            queue_key: default_queue_key(),
            channel: default_channel(),
            keys: StoreKeys::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            current: default_current_key(),
            start_time: default_start_time_key(),
            elapsed: default_elapsed_key(),
            pause_time: default_pause_time_key(),
            pause_duration: default_pause_duration_key(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            user: None,
            pass: None,
            key_path: None,
            sim_track_seconds: default_sim_track_seconds(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, or defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw).map_err(|e| {
                    Error::Config(format!("{}: {e}", path.display()))
                })
            }
            None => Ok(Self::default()),
        }
    }
}
