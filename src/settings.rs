// src/settings.rs
//! Runtime settings.
//!
//! Loaded from `COLDCHAIN_*` environment variables (optionally seeded from a
//! `.env` file by the binary) on top of built-in defaults:
//!
//! - `COLDCHAIN_OWNER`: registry owner address (required)
//! - `COLDCHAIN_LOG_LEVEL`: env_logger filter, default `info`
//! - `COLDCHAIN_EVENT_CHANNEL_CAPACITY`: live event buffer, default 1024

use crate::contracts::cold_chain::DEFAULT_EVENT_CHANNEL_CAPACITY;
use crate::models::entity::Identity;
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    /// The only identity allowed to register entities and batches
    pub owner: Identity,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("COLDCHAIN").try_parsing(true))
            .build()?;
        Self::from_config(config)
    }

    /// Deserializes settings from an already assembled configuration.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.try_deserialize()
    }
}
