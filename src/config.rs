//! Startup configuration for the hosted services.
//!
//! Browser builds bake the values in at compile time; native builds read the
//! process environment first and fall back to the compiled-in values.

use thiserror::Error;

pub const API_KEY_VAR: &str = "FIREBASE_API_KEY";
pub const PROJECT_ID_VAR: &str = "FIREBASE_PROJECT_ID";
pub const POLL_INTERVAL_VAR: &str = "PLAYLIST_POLL_INTERVAL_MS";

const DEFAULT_POLL_INTERVAL_MS: u32 = 1500;
const MIN_POLL_INTERVAL_MS: u32 = 250;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("missing required configuration value {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: String,
    pub project_id: String,
    pub poll_interval_ms: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let api_key = required(API_KEY_VAR)?;
        let project_id = required(PROJECT_ID_VAR)?;

        let poll_interval_ms = match lookup(POLL_INTERVAL_VAR).map(|v| v.trim().to_string()) {
            Some(raw) if !raw.is_empty() => raw
                .parse::<u32>()
                .ok()
                .filter(|ms| *ms >= MIN_POLL_INTERVAL_MS)
                .ok_or(ConfigError::Invalid {
                    key: POLL_INTERVAL_VAR,
                    value: raw,
                })?,
            _ => DEFAULT_POLL_INTERVAL_MS,
        };

        Ok(Self {
            api_key,
            project_id,
            poll_interval_ms,
        })
    }
}

fn compiled_in(key: &str) -> Option<&'static str> {
    match key {
        API_KEY_VAR => option_env!("FIREBASE_API_KEY"),
        PROJECT_ID_VAR => option_env!("FIREBASE_PROJECT_ID"),
        POLL_INTERVAL_VAR => option_env!("PLAYLIST_POLL_INTERVAL_MS"),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
fn lookup(key: &str) -> Option<String> {
    compiled_in(key).map(str::to_string)
}

#[cfg(not(target_arch = "wasm32"))]
fn lookup(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .or_else(|| compiled_in(key).map(str::to_string))
}
