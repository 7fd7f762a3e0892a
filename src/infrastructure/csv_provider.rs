use crate::application::market_data::{PriceField, split_wide_label};
use crate::domain::errors::MarketDataError;
use crate::domain::market::{RawBars, RawRow, WideColumn};
use crate::domain::ports::PriceProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::info;

/// Daily bars from a local CSV file.
///
/// Two layouts are understood:
/// - long: `ticker` (or `symbol`), `date`, `close`, optional `volume`
/// - wide: `date` plus `<Field>_<TICKER>` columns such as `Close_AAPL`,
///   or bare `Close` / `Volume` for a single-ticker file
pub struct CsvPriceProvider {
    path: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn invalid(&self, reason: impl Into<String>) -> anyhow::Error {
        MarketDataError::InvalidData {
            source_name: self.path.display().to_string(),
            reason: reason.into(),
        }
        .into()
    }

    /// Parse `content` and keep rows dated within `[start, end]`.
    pub fn parse(&self, content: &str, start: NaiveDate, end: NaiveDate) -> Result<RawBars> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers: Vec<String> = reader
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|h| h.to_string())
            .collect();
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };

        let date_idx = find(&["date"]).ok_or_else(|| self.invalid("missing 'date' column"))?;
        let in_range = |d: &NaiveDate| *d >= start && *d <= end;

        if let Some(ticker_idx) = find(&["ticker", "symbol"]) {
            let close_idx = find(&["close"]).ok_or_else(|| self.invalid("missing 'close' column"))?;
            let volume_idx = find(&["volume"]);

            let mut rows = Vec::new();
            for record in reader.records() {
                let record = record.context("Malformed CSV record")?;
                let Some(date) = record.get(date_idx).and_then(parse_date) else {
                    continue;
                };
                if !in_range(&date) {
                    continue;
                }
                rows.push(RawRow {
                    ticker: record.get(ticker_idx).unwrap_or_default().to_string(),
                    date,
                    close: record.get(close_idx).and_then(parse_number),
                    volume: volume_idx.and_then(|i| record.get(i)).and_then(parse_number),
                });
            }
            return Ok(RawBars::Long(rows));
        }

        let mut columns: Vec<(usize, WideColumn)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_idx)
            .filter_map(|(i, label)| {
                let (field, ticker) = split_wide_label(label);
                (field != PriceField::Other).then(|| {
                    (
                        i,
                        WideColumn {
                            field: field.name().to_string(),
                            ticker,
                            values: Vec::new(),
                        },
                    )
                })
            })
            .collect();
        if columns.is_empty() {
            return Err(self.invalid("no price columns"));
        }

        let mut dates = Vec::new();
        for record in reader.records() {
            let record = record.context("Malformed CSV record")?;
            let Some(date) = record.get(date_idx).and_then(parse_date) else {
                continue;
            };
            if !in_range(&date) {
                continue;
            }
            dates.push(date);
            for (i, column) in columns.iter_mut() {
                column.values.push(record.get(*i).and_then(parse_number));
            }
        }

        Ok(RawBars::Wide {
            dates,
            columns: columns.into_iter().map(|(_, c)| c).collect(),
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[async_trait]
impl PriceProvider for CsvPriceProvider {
    async fn fetch_daily_bars(
        &self,
        _tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawBars> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read price CSV {}", self.path.display()))?;
        let raw = self.parse(&content, start, end)?;
        info!(
            "CsvPriceProvider: loaded {} from {}",
            raw.tickers_present().join(", "),
            self.path.display()
        );
        Ok(raw)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_parse_long_layout() {
        let csv = "Symbol,Date,Close,Volume\n\
                   aapl,2024-01-02,185.6,1000\n\
                   MSFT,2024-01-02,370.9,\n\
                   AAPL,2024-01-20,190.0,5\n";
        let raw = CsvPriceProvider::new("prices.csv")
            .parse(csv, d(1), d(10))
            .unwrap();

        match raw {
            RawBars::Long(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0].ticker, "aapl");
                assert_eq!(rows[0].volume, Some(1000.0));
                assert_eq!(rows[1].volume, None);
            }
            other => panic!("expected long rows, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_wide_layout() {
        let csv = "Date,Close_AAPL,Open_AAPL,Volume_AAPL,Close_MSFT\n\
                   2024-01-02,185.6,184.0,1000,370.9\n\
                   2024-01-03,184.2,185.0,900,\n";
        let raw = CsvPriceProvider::new("wide.csv")
            .parse(csv, d(1), d(31))
            .unwrap();

        match raw {
            RawBars::Wide { dates, columns } => {
                assert_eq!(dates, vec![d(2), d(3)]);
                // Open_AAPL is not a price field the pipeline reads
                assert_eq!(columns.len(), 3);
                assert_eq!(columns[0].field, "close");
                assert_eq!(columns[0].ticker, "AAPL");
                assert_eq!(columns[1].field, "volume");
                assert_eq!(columns[2].values, vec![Some(370.9), None]);
            }
            other => panic!("expected wide table, got {:?}", other),
        }
    }

    #[test]
    fn test_wide_layout_without_price_columns() {
        let err = CsvPriceProvider::new("wide.csv")
            .parse("Date,Open_AAPL\n2024-01-02,1.0\n", d(1), d(31))
            .unwrap_err();
        assert!(err.to_string().contains("no price columns"));
    }

    #[test]
    fn test_missing_date_column() {
        let err = CsvPriceProvider::new("bad.csv")
            .parse("ticker,close\nAAPL,1\n", d(1), d(2))
            .unwrap_err();
        assert!(err.to_string().contains("date"));
    }
}
