//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.hopper/config.json`) and environment.
//! Kept minimal: a single relay section covering the listener and the heartbeat.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Relay server settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Relay bind, port, and heartbeat settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    /// Port for HTTP and WebSocket (default 3000). Overridden by HOPPER_PORT env.
    #[serde(default = "default_relay_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the device connects over the LAN).
    #[serde(default = "default_relay_bind")]
    pub bind: String,

    /// Interval between server pings to subscribers, in milliseconds (default 15000).
    /// A subscriber silent for two intervals is treated as gone.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,
}

fn default_relay_port() -> u16 {
    3000
}

fn default_relay_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_heartbeat_interval_ms() -> u64 {
    15_000
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: default_relay_port(),
            bind: default_relay_bind(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
        }
    }
}

/// Resolve the relay port: env HOPPER_PORT overrides config.
pub fn resolve_port(config: &Config) -> u16 {
    std::env::var("HOPPER_PORT")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(config.relay.port)
}

/// Host for client connections to this relay: a wildcard bind is reachable on loopback.
pub fn connect_host(bind: &str) -> &str {
    let b = bind.trim();
    if b.is_empty() || b == "0.0.0.0" || b == "::" {
        "127.0.0.1"
    } else {
        b
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("HOPPER_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".hopper").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or HOPPER_CONFIG_PATH). Missing file => default config.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(default_config_path);
    if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        return Ok(Config::default());
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing config from {}", path.display()))
}
