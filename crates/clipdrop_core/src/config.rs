//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_PORT, DEFAULT_STORAGE_TIMEOUT_MS, DEFAULT_SWEEP_INTERVAL_SECS};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for ClipDrop.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    /// Shared secret the scheduler presents to trigger a sweep.
    pub cron_secret: Option<String>,
    /// Seconds between background sweeps; `0` disables the sweeper.
    pub sweep_interval_secs: u64,
    pub storage_timeout_ms: u64,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                let cache_dir = home.join(".cache").join("clipdrop");
                cache_dir.join("db").to_string_lossy().to_string()
            }),
            port: env_parse_or("PORT", DEFAULT_PORT),
            cron_secret: env::var("CRON_SECRET").ok().and_then(non_blank),
            sweep_interval_secs: env_parse_or("SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS),
            storage_timeout_ms: env_parse_or("STORAGE_TIMEOUT_MS", DEFAULT_STORAGE_TIMEOUT_MS),
        }
    }

    /// Interval for the background sweeper, or `None` when disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    /// Bound applied around each storage call made on behalf of a request.
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms.max(1))
    }
}
