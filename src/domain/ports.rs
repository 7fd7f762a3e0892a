use crate::domain::market::{FeatureRow, PriceBar, RawBars};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of daily bars.
///
/// Implementations return whatever layout their upstream uses; normalization
/// happens in the core. An empty payload and an `Err` are treated the same
/// way by the caller ("no price data"), so providers should not paper over
/// failures with fabricated rows.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_daily_bars(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawBars>;

    fn name(&self) -> &str;
}

/// Turns a combined multi-ticker bar table into feature rows.
///
/// Must never fail: rows without enough history keep `None` features.
pub trait FeatureEngineeringService: Send + Sync {
    fn compute(&self, bars: &[PriceBar]) -> Vec<FeatureRow>;
}
