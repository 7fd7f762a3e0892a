use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One trading day for one ticker, after normalization.
///
/// Tickers are already trimmed and uppercased; `(ticker, date)` is unique in
/// any table produced by the price normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(ticker: impl Into<String>, date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            close,
            volume,
        }
    }
}

/// A price bar augmented with the per-ticker time-series features.
///
/// Rolling fields stay `None` until their window is full (or when the value
/// is not finite); the training frame builder is the only place that filters
/// on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    pub ret_1d: Option<f64>,
    pub ret_5d: Option<f64>,
    pub vol_5d: Option<f64>,
    pub vol_21d: Option<f64>,
    pub volume_z: Option<f64>,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: u32,
}

impl FeatureRow {
    /// Row with every rolling feature unset.
    pub fn from_bar(bar: &PriceBar) -> Self {
        Self {
            ticker: bar.ticker.clone(),
            date: bar.date,
            close: bar.close,
            volume: bar.volume,
            ret_1d: None,
            ret_5d: None,
            vol_5d: None,
            vol_21d: None,
            volume_z: None,
            day_of_week: bar.date.weekday().num_days_from_monday(),
        }
    }
}

/// A feature row with its next-day direction label.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub row: FeatureRow,
    /// 1 when the next row of the same ticker closes strictly higher, else 0.
    pub target_up: u8,
}
