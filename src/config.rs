//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. The
//! session section reuses the domain `SessionConfig` directly, so the file
//! can tune every method parameter without a translation layer.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::types::SessionConfig;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub advisor: AdvisorConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
    /// User id sessions are created under.
    pub user: String,
    /// Betting method identifier (see `MethodId`).
    pub method: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory the JSON session snapshots live in.
    pub data_dir: String,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        Ok(config)
    }
}
