use crate::config::{ProviderEnvConfig, ProviderKind};
use crate::domain::ports::PriceProvider;
use crate::infrastructure::alpaca::AlpacaPriceProvider;
use crate::infrastructure::csv_provider::CsvPriceProvider;
use crate::infrastructure::fallback::FallbackPriceProvider;
use crate::infrastructure::marketstack::MarketstackPriceProvider;
use crate::infrastructure::mock::MockPriceProvider;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

pub struct PriceProviderFactory;

impl PriceProviderFactory {
    pub fn create(config: &ProviderEnvConfig) -> Result<Arc<dyn PriceProvider>> {
        let provider: Arc<dyn PriceProvider> = match config.kind {
            ProviderKind::Mock => Arc::new(MockPriceProvider::new()),
            ProviderKind::Alpaca => Arc::new(Self::alpaca(config)?),
            ProviderKind::Marketstack => Arc::new(Self::marketstack(config)?),
            ProviderKind::AlpacaWithMarketstack => Arc::new(FallbackPriceProvider::new(
                Arc::new(Self::alpaca(config)?),
                Arc::new(Self::marketstack(config)?),
            )),
            ProviderKind::Csv => {
                let path = config
                    .csv_path
                    .clone()
                    .context("PRICE_CSV_PATH must be set when PRICE_PROVIDER=csv")?;
                Arc::new(CsvPriceProvider::new(path))
            }
        };

        info!("PriceProviderFactory: using {} price provider", provider.name());
        Ok(provider)
    }

    fn alpaca(config: &ProviderEnvConfig) -> Result<AlpacaPriceProvider> {
        let mut builder = AlpacaPriceProvider::builder()
            .api_key(config.alpaca_api_key.clone())
            .api_secret(config.alpaca_secret_key.clone())
            .feed(config.alpaca_feed.clone())
            .http_settings(config.http);
        if let Some(url) = &config.alpaca_data_url {
            builder = builder.data_base_url(url.clone());
        }
        builder.build()
    }

    fn marketstack(config: &ProviderEnvConfig) -> Result<MarketstackPriceProvider> {
        MarketstackPriceProvider::new(
            config.marketstack_api_key.clone(),
            config.marketstack_base_url.clone(),
            config.http,
        )
    }
}
