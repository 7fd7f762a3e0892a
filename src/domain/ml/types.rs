use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inbound `train` call.
///
/// Accepts a single `ticker` alias next to the `tickers` list; both are
/// merged (alias first) before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickers: Option<Vec<String>>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TrainRequest {
    pub fn new<S: Into<String>>(
        tickers: impl IntoIterator<Item = S>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            ticker: None,
            tickers: Some(tickers.into_iter().map(Into::into).collect()),
            start_date,
            end_date,
        }
    }

    /// Raw ticker labels as supplied, alias first.
    pub fn requested_tickers(&self) -> Vec<&str> {
        self.ticker
            .iter()
            .map(String::as_str)
            .chain(self.tickers.iter().flatten().map(String::as_str))
            .collect()
    }
}

/// Outcome of a successful `train` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSummary {
    pub message: String,
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rows used for fitting, after label drop and null cleaning.
    pub n_rows: usize,
    /// Same count as `n_rows`.
    pub n_samples: usize,
    pub n_features: usize,
    pub feature_columns: Vec<String>,
    /// Normalized price rows returned by the provider.
    pub price_rows: usize,
    pub roc_auc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub ticker: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectionLabel {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN/FLAT")]
    DownOrFlat,
}

impl DirectionLabel {
    pub fn from_probability(prob_up: f64) -> Self {
        if prob_up >= 0.5 {
            DirectionLabel::Up
        } else {
            DirectionLabel::DownOrFlat
        }
    }
}

impl fmt::Display for DirectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionLabel::Up => write!(f, "UP"),
            DirectionLabel::DownOrFlat => write!(f, "DOWN/FLAT"),
        }
    }
}

/// Outcome of a successful `predict-next` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub ticker: String,
    pub prob_up: f64,
    pub label: DirectionLabel,
    /// Date of the feature row the probability was computed from.
    pub as_of: NaiveDate,
}
