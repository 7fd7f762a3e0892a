//! Feature window and trainer configuration parsing from environment variables.

use crate::application::feature_engineering_service::FeatureConfig;
use crate::application::ml::{ModelServiceConfig, TrainerConfig};
use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEnvConfig {
    // Feature windows
    pub short_window: usize,
    pub long_window: usize,
    pub volume_window: usize,
    pub return_lag: usize,

    // Training
    pub min_rows: usize,
    pub min_feature_coverage: f64,
    pub small_sample_warning: usize,
    pub l2_alpha: f64,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        Self {
            short_window: 5,
            long_window: 21,
            volume_window: 21,
            return_lag: 5,
            min_rows: 2,
            min_feature_coverage: 0.9,
            small_sample_warning: 20,
            l2_alpha: 1.0,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            short_window: Self::parse_usize("FEATURE_SHORT_WINDOW", defaults.short_window)?,
            long_window: Self::parse_usize("FEATURE_LONG_WINDOW", defaults.long_window)?,
            volume_window: Self::parse_usize("FEATURE_VOLUME_WINDOW", defaults.volume_window)?,
            return_lag: Self::parse_usize("FEATURE_RETURN_LAG", defaults.return_lag)?,
            min_rows: Self::parse_usize("MODEL_MIN_ROWS", defaults.min_rows)?,
            min_feature_coverage: Self::parse_f64(
                "MODEL_MIN_FEATURE_COVERAGE",
                defaults.min_feature_coverage,
            )?,
            small_sample_warning: Self::parse_usize(
                "MODEL_SMALL_SAMPLE_WARNING",
                defaults.small_sample_warning,
            )?,
            l2_alpha: Self::parse_f64("MODEL_L2_ALPHA", defaults.l2_alpha)?,
        };

        if config.short_window < 2 || config.long_window < 2 || config.volume_window < 2 {
            anyhow::bail!("Feature windows must be at least 2");
        }
        if config.return_lag == 0 {
            anyhow::bail!("FEATURE_RETURN_LAG must be at least 1");
        }
        if !(0.0..=1.0).contains(&config.min_feature_coverage) {
            anyhow::bail!("MODEL_MIN_FEATURE_COVERAGE must be between 0 and 1");
        }
        if !(config.l2_alpha.is_finite() && config.l2_alpha >= 0.0) {
            anyhow::bail!("MODEL_L2_ALPHA must be a non-negative number");
        }
        Ok(config)
    }

    pub fn service_config(&self) -> ModelServiceConfig {
        ModelServiceConfig {
            features: FeatureConfig {
                return_lag: self.return_lag,
                short_window: self.short_window,
                long_window: self.long_window,
                volume_window: self.volume_window,
            },
            min_rows: self.min_rows,
            min_coverage: self.min_feature_coverage,
            trainer: TrainerConfig {
                l2_alpha: self.l2_alpha,
                small_sample_warning: self.small_sample_warning,
            },
        }
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}
