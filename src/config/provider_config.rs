//! Price provider configuration parsing from environment variables.
//!
//! Selects the upstream (`PRICE_PROVIDER`) and carries the credentials and
//! endpoints of every supported source:
//! - Alpaca market data (daily bars)
//! - Marketstack (end-of-day prices)
//! - a local CSV file

use crate::infrastructure::core::HttpClientSettings;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which upstream serves daily bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Mock,
    Alpaca,
    Marketstack,
    /// Alpaca first, Marketstack for tickers Alpaca has nothing for
    AlpacaWithMarketstack,
    Csv,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" => Ok(ProviderKind::Mock),
            "alpaca" => Ok(ProviderKind::Alpaca),
            "marketstack" => Ok(ProviderKind::Marketstack),
            "alpaca+marketstack" => Ok(ProviderKind::AlpacaWithMarketstack),
            "csv" => Ok(ProviderKind::Csv),
            _ => anyhow::bail!(
                "Invalid PRICE_PROVIDER: {}. Must be 'mock', 'alpaca', 'marketstack', 'alpaca+marketstack' or 'csv'",
                s
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderEnvConfig {
    pub kind: ProviderKind,
    pub alpaca_api_key: String,
    pub alpaca_secret_key: String,
    /// `None` keeps the provider's public endpoint
    pub alpaca_data_url: Option<String>,
    pub alpaca_feed: String,
    pub marketstack_api_key: String,
    pub marketstack_base_url: Option<String>,
    pub csv_path: Option<PathBuf>,
    pub http: HttpClientSettings,
}

impl ProviderEnvConfig {
    pub fn from_env() -> Result<Self> {
        let kind = ProviderKind::from_str(
            &env::var("PRICE_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
        )?;

        let timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .context("Failed to parse HTTP_TIMEOUT_SECS")?;
        let max_retries = env::var("HTTP_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .context("Failed to parse HTTP_MAX_RETRIES")?;

        Ok(Self {
            kind,
            alpaca_api_key: env::var("ALPACA_API_KEY").unwrap_or_default(),
            alpaca_secret_key: env::var("ALPACA_SECRET_KEY").unwrap_or_default(),
            alpaca_data_url: non_empty_var("ALPACA_DATA_URL"),
            alpaca_feed: env::var("ALPACA_FEED").unwrap_or_else(|_| "iex".to_string()),
            marketstack_api_key: env::var("MARKETSTACK_API_KEY").unwrap_or_default(),
            marketstack_base_url: non_empty_var("MARKETSTACK_BASE_URL"),
            csv_path: non_empty_var("PRICE_CSV_PATH").map(PathBuf::from),
            http: HttpClientSettings {
                timeout: Duration::from_secs(timeout_secs),
                max_retries,
                ..HttpClientSettings::default()
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
