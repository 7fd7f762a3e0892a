//! Raw provider payloads → canonical long table of [`PriceBar`].
//!
//! Every provider shape in [`RawBars`] is flattened into `(ticker, date)`
//! rows, tickers are canonicalized, duplicates are dropped and each ticker's
//! rows come out sorted by date.

use crate::domain::errors::ModelError;
use crate::domain::market::{PriceBar, RawBars, RawRow};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Trim and uppercase a ticker label.
pub fn canonicalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Canonicalize, drop blanks and deduplicate, keeping first-seen order.
pub fn canonicalize_tickers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for ticker in raw {
        let t = canonicalize_ticker(ticker.as_ref());
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Field a wide-table column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Close,
    Volume,
    Other,
}

impl PriceField {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "close" | "c" => PriceField::Close,
            "volume" | "v" => PriceField::Volume,
            _ => PriceField::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PriceField::Close => "close",
            PriceField::Volume => "volume",
            PriceField::Other => "other",
        }
    }
}

/// Split a flattened wide-table label such as `Close_AAPL` into field and
/// ticker. Labels without a ticker suffix (`Close`) yield an empty ticker.
///
/// Only the first separator is significant so tickers may contain `_`.
pub fn split_wide_label(label: &str) -> (PriceField, String) {
    match label.split_once('_') {
        Some((field, ticker)) => (PriceField::parse(field), ticker.trim().to_string()),
        None => (PriceField::parse(label), String::new()),
    }
}

#[derive(Debug, Default)]
pub struct PriceNormalizer;

impl PriceNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Flatten `raw` into sorted, deduplicated price bars.
    ///
    /// When `requested` is non-empty, rows for other tickers are ignored and
    /// the output follows the requested order. An empty result is an error.
    pub fn normalize(
        &self,
        raw: RawBars,
        requested: &[String],
    ) -> Result<Vec<PriceBar>, ModelError> {
        let mut rows = Vec::new();
        flatten(raw, requested, &mut rows);

        let mut order: Vec<String> = requested.to_vec();
        let mut series: HashMap<String, BTreeMap<NaiveDate, PriceBar>> = HashMap::new();
        let mut skipped = 0usize;

        for row in rows {
            let ticker = canonicalize_ticker(&row.ticker);
            if ticker.is_empty() {
                skipped += 1;
                continue;
            }
            if !requested.is_empty() && !requested.contains(&ticker) {
                skipped += 1;
                continue;
            }

            let close = match row.close {
                Some(c) if c.is_finite() && c > 0.0 => c,
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            let volume = row
                .volume
                .filter(|v| v.is_finite() && *v > 0.0)
                .map(|v| v.round() as u64)
                .unwrap_or(0);

            if !order.contains(&ticker) {
                order.push(ticker.clone());
            }
            series
                .entry(ticker.clone())
                .or_default()
                .entry(row.date)
                .or_insert_with(|| PriceBar::new(ticker, row.date, close, volume));
        }

        if skipped > 0 {
            debug!("PriceNormalizer: skipped {} unusable raw rows", skipped);
        }

        let bars: Vec<PriceBar> = order
            .iter()
            .filter_map(|t| series.remove(t))
            .flat_map(|by_date| by_date.into_values())
            .collect();

        if bars.is_empty() {
            warn!("PriceNormalizer: no usable rows for {:?}", requested);
            return Err(ModelError::NoPriceData {
                tickers: requested.to_vec(),
            });
        }

        debug!(
            "PriceNormalizer: {} rows across {} tickers",
            bars.len(),
            order.len()
        );
        Ok(bars)
    }
}

fn flatten(raw: RawBars, requested: &[String], out: &mut Vec<RawRow>) {
    match raw {
        RawBars::Single { ticker, bars } => {
            out.extend(bars.into_iter().map(|b| RawRow {
                ticker: ticker.clone(),
                date: b.date,
                close: b.close,
                volume: b.volume,
            }));
        }
        RawBars::ByTicker(series) => {
            for (ticker, bars) in series {
                out.extend(bars.into_iter().map(|b| RawRow {
                    ticker: ticker.clone(),
                    date: b.date,
                    close: b.close,
                    volume: b.volume,
                }));
            }
        }
        RawBars::Wide { dates, columns } => flatten_wide(&dates, columns, requested, out),
        RawBars::Long(rows) => out.extend(rows),
        RawBars::Many(parts) => {
            for part in parts {
                flatten(part, requested, out);
            }
        }
    }
}

/// Pivot wide columns back to long rows.
///
/// Unlabeled columns belong to the single requested ticker; with several
/// requested tickers they are ambiguous and dropped.
fn flatten_wide(
    dates: &[NaiveDate],
    columns: Vec<crate::domain::market::WideColumn>,
    requested: &[String],
    out: &mut Vec<RawRow>,
) {
    let mut closes: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    let mut volumes: HashMap<String, Vec<Option<f64>>> = HashMap::new();

    for column in columns {
        let ticker = if column.ticker.trim().is_empty() {
            match requested {
                [only] => only.clone(),
                _ => {
                    warn!(
                        "PriceNormalizer: unlabeled '{}' column with {} requested tickers, dropping",
                        column.field,
                        requested.len()
                    );
                    continue;
                }
            }
        } else {
            canonicalize_ticker(&column.ticker)
        };

        match PriceField::parse(&column.field) {
            PriceField::Close => closes.push((ticker, column.values)),
            PriceField::Volume => {
                volumes.insert(ticker, column.values);
            }
            PriceField::Other => {}
        }
    }

    for (ticker, values) in closes {
        let vols = volumes.get(&ticker);
        for (i, date) in dates.iter().enumerate() {
            out.push(RawRow {
                ticker: ticker.clone(),
                date: *date,
                close: values.get(i).copied().flatten(),
                volume: vols.and_then(|v| v.get(i).copied().flatten()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::{RawBar, WideColumn};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canonicalize_tickers_dedup_preserves_order() {
        let out = canonicalize_tickers([" aapl ", "AAPL", "aApL  ", "msft", "", "  "]);
        assert_eq!(out, tickers(&["AAPL", "MSFT"]));

        // Idempotent
        assert_eq!(canonicalize_tickers(&out), out);
    }

    #[test]
    fn test_split_wide_label() {
        assert_eq!(split_wide_label("Close_AAPL"), (PriceField::Close, "AAPL".into()));
        assert_eq!(split_wide_label("volume_msft"), (PriceField::Volume, "msft".into()));
        assert_eq!(split_wide_label("Close"), (PriceField::Close, String::new()));
        assert_eq!(
            split_wide_label("Close_BRK_B"),
            (PriceField::Close, "BRK_B".into())
        );
        assert_eq!(split_wide_label("Open_AAPL").0, PriceField::Other);
    }

    #[test]
    fn test_single_series_is_sorted_and_deduplicated() {
        let raw = RawBars::Single {
            ticker: " aapl".to_string(),
            bars: vec![
                RawBar::new(day(4), 12.0, 100.0),
                RawBar::new(day(3), 11.0, 100.0),
                RawBar::new(day(4), 99.0, 100.0),
            ],
        };

        let bars = PriceNormalizer::new().normalize(raw, &tickers(&["AAPL"])).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, day(3));
        assert_eq!(bars[1].close, 12.0); // first occurrence wins
        assert!(bars.iter().all(|b| b.ticker == "AAPL"));
    }

    #[test]
    fn test_by_ticker_follows_requested_order() {
        let raw = RawBars::ByTicker(vec![
            ("MSFT".to_string(), vec![RawBar::new(day(3), 300.0, 10.0)]),
            ("AAPL".to_string(), vec![RawBar::new(day(3), 200.0, 10.0)]),
            ("TSLA".to_string(), vec![RawBar::new(day(3), 400.0, 10.0)]),
        ]);

        let bars = PriceNormalizer::new()
            .normalize(raw, &tickers(&["AAPL", "MSFT"]))
            .unwrap();
        let order: Vec<&str> = bars.iter().map(|b| b.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_wide_table_pivots_per_ticker_columns() {
        let raw = RawBars::Wide {
            dates: vec![day(3), day(4)],
            columns: vec![
                WideColumn {
                    field: "Close".into(),
                    ticker: "AAPL".into(),
                    values: vec![Some(1.0), Some(2.0)],
                },
                WideColumn {
                    field: "Volume".into(),
                    ticker: "AAPL".into(),
                    values: vec![Some(10.4), None],
                },
                WideColumn {
                    field: "Close".into(),
                    ticker: "msft".into(),
                    values: vec![None, Some(5.0)],
                },
            ],
        };

        let bars = PriceNormalizer::new()
            .normalize(raw, &tickers(&["AAPL", "MSFT"]))
            .unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].volume, 10);
        assert_eq!(bars[1].volume, 0);
        assert_eq!(bars[2].ticker, "MSFT");
        assert_eq!(bars[2].date, day(4));
    }

    #[test]
    fn test_unlabeled_wide_columns_use_single_requested_ticker() {
        let raw = RawBars::Wide {
            dates: vec![day(3)],
            columns: vec![WideColumn {
                field: "close".into(),
                ticker: String::new(),
                values: vec![Some(7.0)],
            }],
        };
        let bars = PriceNormalizer::new().normalize(raw.clone(), &tickers(&["NVDA"])).unwrap();
        assert_eq!(bars[0].ticker, "NVDA");

        let err = PriceNormalizer::new()
            .normalize(raw, &tickers(&["NVDA", "AAPL"]))
            .unwrap_err();
        assert!(matches!(err, ModelError::NoPriceData { .. }));
    }

    #[test]
    fn test_invalid_closes_are_skipped() {
        let raw = RawBars::Long(vec![
            RawRow {
                ticker: "AAPL".into(),
                date: day(3),
                close: Some(f64::NAN),
                volume: None,
            },
            RawRow {
                ticker: "AAPL".into(),
                date: day(4),
                close: Some(-1.0),
                volume: None,
            },
        ]);
        let err = PriceNormalizer::new().normalize(raw, &tickers(&["AAPL"])).unwrap_err();
        assert_eq!(
            err,
            ModelError::NoPriceData {
                tickers: tickers(&["AAPL"])
            }
        );
    }

    #[test]
    fn test_empty_payload_is_no_price_data() {
        let err = PriceNormalizer::new()
            .normalize(RawBars::empty(), &tickers(&["AAPL"]))
            .unwrap_err();
        assert!(matches!(err, ModelError::NoPriceData { .. }));
    }

    #[test]
    fn test_many_payloads_are_merged() {
        let raw = RawBars::Many(vec![
            RawBars::Single {
                ticker: "AAPL".into(),
                bars: vec![RawBar::new(day(3), 1.0, 1.0)],
            },
            RawBars::Long(vec![RawRow {
                ticker: "msft".into(),
                date: day(3),
                close: Some(2.0),
                volume: Some(3.0),
            }]),
        ]);
        let bars = PriceNormalizer::new()
            .normalize(raw, &tickers(&["AAPL", "MSFT"]))
            .unwrap();
        assert_eq!(bars.len(), 2);
    }
}
