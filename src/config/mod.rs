//! Configuration module for RustSense.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: price providers and the model pipeline.

mod model_config;
mod provider_config;

pub use model_config::ModelEnvConfig;
pub use provider_config::{ProviderEnvConfig, ProviderKind};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderEnvConfig,
    pub model: ModelEnvConfig,

    // Range used when a caller gives no dates
    pub default_start_date: NaiveDate,
    pub default_end_date: NaiveDate,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let provider = ProviderEnvConfig::from_env().context("Failed to load provider config")?;
        let model = ModelEnvConfig::from_env().context("Failed to load model config")?;

        let default_start_date = Self::parse_date("DEFAULT_START_DATE", "2023-01-01")?;
        let default_end_date = Self::parse_date("DEFAULT_END_DATE", "2024-01-01")?;
        if default_start_date >= default_end_date {
            anyhow::bail!("DEFAULT_START_DATE must be before DEFAULT_END_DATE");
        }

        Ok(Self {
            provider,
            model,
            default_start_date,
            default_end_date,
        })
    }

    fn parse_date(key: &str, default: &str) -> Result<NaiveDate> {
        let raw = env::var(key).unwrap_or_else(|_| default.to_string());
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .context(format!("Failed to parse {} (expected YYYY-MM-DD)", key))
    }
}
