use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the train / predict-next pipeline.
///
/// Everything except [`ModelError::Fit`] is a caller mistake or a data
/// condition and maps to a 4xx-style response; `Fit` is an unexpected
/// numerical failure inside the classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("At least one ticker is required (ticker or tickers field).")]
    MissingTickers,

    #[error("start_date must be before end_date")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("No price data returned for given tickers and date range: {}", tickers.join(", "))]
    NoPriceData { tickers: Vec<String> },

    #[error("Not enough rows to train a model (n={n}). Need at least 2.")]
    InsufficientRows { n: usize },

    #[error("No training samples found for ticker '{ticker}'")]
    UnknownTicker { ticker: String },

    #[error("Model has not been trained yet in this process")]
    ModelNotTrained,

    #[error("Model fit failed: {reason}")]
    Fit { reason: String },
}

impl ModelError {
    pub fn is_user_error(&self) -> bool {
        !matches!(self, ModelError::Fit { .. })
    }
}

/// Errors raised by price providers.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Missing credentials for {provider}: set {variable}")]
    MissingCredentials {
        provider: &'static str,
        variable: &'static str,
    },

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid market data from {source_name}: {reason}")]
    InvalidData { source_name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_rows_formatting() {
        let msg = ModelError::InsufficientRows { n: 1 }.to_string();
        assert!(msg.contains("Not enough rows"));
        assert!(msg.contains("n=1"));
    }

    #[test]
    fn test_no_price_data_formatting() {
        let err = ModelError::NoPriceData {
            tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("No price data returned for given tickers"));
        assert!(msg.contains("AAPL, MSFT"));
    }

    #[test]
    fn test_only_fit_is_fatal() {
        assert!(ModelError::ModelNotTrained.is_user_error());
        assert!(ModelError::MissingTickers.is_user_error());
        assert!(
            !ModelError::Fit {
                reason: "singular".to_string()
            }
            .is_user_error()
        );
    }

    #[test]
    fn test_unknown_ticker_formatting() {
        let err = ModelError::UnknownTicker {
            ticker: "MSFT".to_string(),
        };
        assert_eq!(err.to_string(), "No training samples found for ticker 'MSFT'");
    }
}
