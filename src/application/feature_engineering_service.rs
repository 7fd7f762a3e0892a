use crate::application::market_data::statistical_features::{
    pct_change, rolling_std, rolling_zscore,
};
use crate::domain::market::{FeatureRow, PriceBar, group_by_ticker};
use crate::domain::ports::FeatureEngineeringService;
use rayon::prelude::*;
use tracing::debug;

/// Window sizes for the daily feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Lag of the multi-day return (`ret_5d`).
    pub return_lag: usize,
    /// Window of the short return volatility (`vol_5d`).
    pub short_window: usize,
    /// Window of the long return volatility (`vol_21d`).
    pub long_window: usize,
    /// Trailing window of the volume z-score.
    pub volume_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            return_lag: 5,
            short_window: 5,
            long_window: 21,
            volume_window: 21,
        }
    }
}

/// Per-ticker daily features: returns, return volatility, volume z-score and
/// weekday.
///
/// The combined table is split by ticker before any windowed computation so
/// values never cross ticker boundaries; tickers are processed in parallel
/// and re-merged in first-seen order.
pub struct DailyFeatureEngineeringService {
    config: FeatureConfig,
}

impl DailyFeatureEngineeringService {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// Features for one ticker's bars, which must all share a ticker.
    fn compute_series(&self, bars: &mut [&PriceBar]) -> Vec<FeatureRow> {
        bars.sort_by_key(|b| b.date);

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

        let ret_1d = pct_change(&closes, 1);
        let ret_5d = pct_change(&closes, self.config.return_lag);
        let vol_5d = rolling_std(&ret_1d, self.config.short_window);
        let vol_21d = rolling_std(&ret_1d, self.config.long_window);
        let volume_z = rolling_zscore(&volumes, self.config.volume_window);

        bars.iter()
            .enumerate()
            .map(|(t, bar)| FeatureRow {
                ret_1d: ret_1d[t],
                ret_5d: ret_5d[t],
                vol_5d: vol_5d[t],
                vol_21d: vol_21d[t],
                volume_z: volume_z[t],
                ..FeatureRow::from_bar(bar)
            })
            .collect()
    }
}

impl Default for DailyFeatureEngineeringService {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl FeatureEngineeringService for DailyFeatureEngineeringService {
    fn compute(&self, bars: &[PriceBar]) -> Vec<FeatureRow> {
        let mut groups = group_by_ticker(bars, |b| b.ticker.as_str());

        let rows: Vec<FeatureRow> = groups
            .par_iter_mut()
            .map(|(_, series)| self.compute_series(series))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect();

        debug!(
            "FeatureEngineering: {} rows across {} tickers",
            rows.len(),
            groups.len()
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(ticker: &str, closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(); // Monday
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                PriceBar::new(
                    ticker,
                    start + Duration::days(i as i64),
                    *c,
                    1_000 + (i as u64 * 37) % 200,
                )
            })
            .collect()
    }

    #[test]
    fn test_single_row_ticker_has_no_returns() {
        let rows = DailyFeatureEngineeringService::default().compute(&series("AAPL", &[10.0]));
        assert_eq!(rows.len(), 1);
        assert!(rows[0].ret_1d.is_none());
        assert!(rows[0].vol_5d.is_none());
        assert!(rows[0].volume_z.is_none());
        assert_eq!(rows[0].day_of_week, 0);
    }

    #[test]
    fn test_warm_up_periods() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let rows = DailyFeatureEngineeringService::default().compute(&series("AAPL", &closes));

        assert!(rows[0].ret_1d.is_none());
        assert!(rows[1].ret_1d.is_some());
        assert!(rows[4].ret_5d.is_none());
        assert!(rows[5].ret_5d.is_some());
        // 5 returns needed, first return is at index 1
        assert!(rows[4].vol_5d.is_none());
        assert!(rows[5].vol_5d.is_some());
        assert!(rows[20].vol_21d.is_none());
        assert!(rows[21].vol_21d.is_some());
        assert!(rows[19].volume_z.is_none());
        assert!(rows[20].volume_z.is_some());
    }

    #[test]
    fn test_ret_values() {
        let rows = DailyFeatureEngineeringService::default()
            .compute(&series("AAPL", &[100.0, 110.0, 121.0, 121.0, 121.0, 200.0]));
        assert!((rows[1].ret_1d.unwrap() - 0.1).abs() < 1e-12);
        assert!((rows[5].ret_5d.unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_leak_across_tickers() {
        let mut bars = series("AAPL", &[100.0, 101.0, 102.0]);
        bars.extend(series("MSFT", &[50.0, 40.0]));
        // Interleave to make sure grouping does not rely on input order
        bars.swap(1, 3);

        let rows = DailyFeatureEngineeringService::default().compute(&bars);
        assert_eq!(rows.len(), 5);

        let msft: Vec<&FeatureRow> = rows.iter().filter(|r| r.ticker == "MSFT").collect();
        assert!(msft[0].ret_1d.is_none(), "first MSFT row must not see AAPL closes");
        assert!((msft[1].ret_1d.unwrap() + 0.2).abs() < 1e-12);

        let aapl: Vec<&FeatureRow> = rows.iter().filter(|r| r.ticker == "AAPL").collect();
        assert!(aapl.windows(2).all(|w| w[0].date < w[1].date));
        assert!(aapl[0].ret_1d.is_none());
    }

    #[test]
    fn test_gaps_in_trading_days_use_row_order() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let bars = vec![
            PriceBar::new("AAPL", d(2), 100.0, 10),
            PriceBar::new("AAPL", d(9), 50.0, 10),
        ];
        let rows = DailyFeatureEngineeringService::default().compute(&bars);
        assert!((rows[1].ret_1d.unwrap() + 0.5).abs() < 1e-12);
    }
}
