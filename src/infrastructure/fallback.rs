use crate::domain::market::RawBars;
use crate::domain::ports::PriceProvider;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::warn;

/// Asks `primary` first, then `fallback` for every ticker the primary
/// returned nothing for.
pub struct FallbackPriceProvider {
    primary: Arc<dyn PriceProvider>,
    fallback: Arc<dyn PriceProvider>,
    name: String,
}

impl FallbackPriceProvider {
    pub fn new(primary: Arc<dyn PriceProvider>, fallback: Arc<dyn PriceProvider>) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            name,
        }
    }
}

#[async_trait]
impl PriceProvider for FallbackPriceProvider {
    async fn fetch_daily_bars(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawBars> {
        let primary = match self.primary.fetch_daily_bars(tickers, start, end).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "FallbackPriceProvider: primary {} failed: {:#}",
                    self.primary.name(),
                    e
                );
                RawBars::empty()
            }
        };

        let present: Vec<String> = primary
            .tickers_present()
            .iter()
            .map(|t| t.trim().to_uppercase())
            .collect();
        let missing: Vec<String> = tickers
            .iter()
            .filter(|t| !present.contains(t))
            .cloned()
            .collect();

        if missing.is_empty() {
            return Ok(primary);
        }

        warn!(
            "FallbackPriceProvider: no {} data for {:?}, trying {}",
            self.primary.name(),
            missing,
            self.fallback.name()
        );
        let secondary = self.fallback.fetch_daily_bars(&missing, start, end).await;

        match secondary {
            Ok(raw) if primary.is_empty() => Ok(raw),
            Ok(raw) => Ok(RawBars::Many(vec![primary, raw])),
            Err(e) if primary.is_empty() => Err(e),
            Err(e) => {
                warn!(
                    "FallbackPriceProvider: fallback {} failed: {:#}",
                    self.fallback.name(),
                    e
                );
                Ok(primary)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
