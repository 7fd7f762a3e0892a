use crate::domain::market::RawBar;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets";
pub const DEFAULT_FEED: &str = "iex";

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: String,
    #[serde(rename = "o", default)]
    pub open: Option<f64>,
    #[serde(rename = "h", default)]
    pub high: Option<f64>,
    #[serde(rename = "l", default)]
    pub low: Option<f64>,
    #[serde(rename = "c")]
    pub close: Option<f64>,
    #[serde(rename = "v", default)]
    pub volume: Option<f64>,
}

impl AlpacaBar {
    /// Trading date of the bar. Daily bars are stamped at midnight of the
    /// session date in UTC (`2024-01-02T05:00:00Z` style for some feeds),
    /// so the date part of the RFC 3339 string is used as-is.
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.date_naive())
            .or_else(|| {
                self.timestamp
                    .get(..10)
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            })
    }

    pub fn to_raw_bar(&self) -> Option<RawBar> {
        self.date().map(|date| RawBar {
            date,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// `GET /v2/stocks/bars` page.
#[derive(Debug, Deserialize)]
pub struct AlpacaBarsResponse {
    #[serde(default)]
    pub bars: Option<HashMap<String, Vec<AlpacaBar>>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bars_page() {
        let json = r#"{
            "bars": {
                "AAPL": [
                    {"t": "2024-01-02T05:00:00Z", "o": 187.1, "h": 188.4, "l": 183.9, "c": 185.6, "v": 82488700, "n": 1, "vw": 185.9}
                ]
            },
            "next_page_token": null
        }"#;
        let page: AlpacaBarsResponse = serde_json::from_str(json).unwrap();
        let bars = page.bars.unwrap();
        let raw = bars["AAPL"][0].to_raw_bar().unwrap();
        assert_eq!(raw.date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(raw.close, Some(185.6));
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_null_bars_is_empty_page() {
        let page: AlpacaBarsResponse =
            serde_json::from_str(r#"{"bars": null, "next_page_token": null}"#).unwrap();
        assert!(page.bars.is_none());
    }
}
