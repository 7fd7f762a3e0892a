//! Raw provider payloads before normalization.
//!
//! Providers disagree on layout: some return one series per request, some
//! nest series under the ticker, some return a wide table with one column per
//! (field, ticker) pair and some return long rows. `RawBars` keeps each shape
//! as-is so the normalizer is the single place that flattens them.

use chrono::NaiveDate;

/// One daily observation without a ticker label.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    pub fn new(date: NaiveDate, close: f64, volume: f64) -> Self {
        Self {
            date,
            close: Some(close),
            volume: Some(volume),
        }
    }
}

/// One daily observation in long format.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// One column of a wide table, keyed by field and ticker.
///
/// `ticker` is empty when the provider did not label the column (single
/// ticker downloads).
#[derive(Debug, Clone, PartialEq)]
pub struct WideColumn {
    pub field: String,
    pub ticker: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawBars {
    /// A single unlabeled series belonging to `ticker`.
    Single { ticker: String, bars: Vec<RawBar> },
    /// Series nested under their ticker, in provider order.
    ByTicker(Vec<(String, Vec<RawBar>)>),
    /// Date-indexed table with one column per (field, ticker).
    Wide {
        dates: Vec<NaiveDate>,
        columns: Vec<WideColumn>,
    },
    /// Already long: one row per (ticker, date).
    Long(Vec<RawRow>),
    /// Several payloads stitched together (e.g. primary + fallback provider).
    Many(Vec<RawBars>),
}

impl RawBars {
    pub fn empty() -> Self {
        RawBars::Long(Vec::new())
    }

    /// True when the payload holds no observation with a close price.
    pub fn is_empty(&self) -> bool {
        match self {
            RawBars::Single { bars, .. } => bars.iter().all(|b| b.close.is_none()),
            RawBars::ByTicker(series) => series
                .iter()
                .all(|(_, bars)| bars.iter().all(|b| b.close.is_none())),
            RawBars::Wide { dates, columns } => {
                dates.is_empty() || columns.iter().all(|c| c.values.iter().all(Option::is_none))
            }
            RawBars::Long(rows) => rows.iter().all(|r| r.close.is_none()),
            RawBars::Many(parts) => parts.iter().all(RawBars::is_empty),
        }
    }

    /// Ticker labels that carry at least one observation, as the provider
    /// spelled them.
    pub fn tickers_present(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |t: &str| {
            if !out.iter().any(|seen| seen == t) {
                out.push(t.to_string());
            }
        };
        match self {
            RawBars::Single { ticker, bars } => {
                if bars.iter().any(|b| b.close.is_some()) {
                    push(ticker);
                }
            }
            RawBars::ByTicker(series) => {
                for (ticker, bars) in series {
                    if bars.iter().any(|b| b.close.is_some()) {
                        push(ticker);
                    }
                }
            }
            RawBars::Wide { columns, .. } => {
                for column in columns {
                    if !column.ticker.is_empty() && column.values.iter().any(Option::is_some) {
                        push(&column.ticker);
                    }
                }
            }
            RawBars::Long(rows) => {
                for row in rows.iter().filter(|r| r.close.is_some()) {
                    push(&row.ticker);
                }
            }
            RawBars::Many(parts) => {
                for part in parts {
                    for ticker in part.tickers_present() {
                        push(&ticker);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    #[test]
    fn test_empty_detection() {
        assert!(RawBars::empty().is_empty());
        assert!(RawBars::Many(vec![RawBars::empty(), RawBars::ByTicker(vec![])]).is_empty());

        let no_close = RawBars::Single {
            ticker: "AAPL".to_string(),
            bars: vec![RawBar {
                date: day(3),
                close: None,
                volume: Some(1.0),
            }],
        };
        assert!(no_close.is_empty());

        let one = RawBars::Single {
            ticker: "AAPL".to_string(),
            bars: vec![RawBar::new(day(3), 1.0, 1.0)],
        };
        assert!(!one.is_empty());
    }

    #[test]
    fn test_tickers_present_skips_empty_series() {
        let raw = RawBars::ByTicker(vec![
            ("aapl".to_string(), vec![RawBar::new(day(3), 1.0, 1.0)]),
            ("MSFT".to_string(), vec![]),
        ]);
        assert_eq!(raw.tickers_present(), vec!["aapl".to_string()]);
    }
}
