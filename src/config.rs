//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes it into strongly-typed structs.
//! Model artifact and tier table paths are resolved relative to the
//! working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Config path used when `CARPRICE_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub models: ModelsConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub name: String,
    /// Display label for prices; the models predict in this currency.
    pub currency: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    pub low_path: PathBuf,
    pub high_path: PathBuf,
    /// Exit at startup if either artifact fails to load. When false the
    /// server keeps running and reports the model as unavailable per request.
    #[serde(default = "default_true")]
    pub require_at_startup: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FeaturesConfig {
    /// Tier table override; the built-in table is used when absent.
    #[serde(default)]
    pub tiers_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub enabled: bool,
    pub port: u16,
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Config path from `CARPRICE_CONFIG`, falling back to `config.toml`.
    pub fn resolve_path() -> String {
        std::env::var("CARPRICE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    }
}
