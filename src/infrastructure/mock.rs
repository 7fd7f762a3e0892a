use crate::domain::market::{RawBar, RawBars};
use crate::domain::ports::PriceProvider;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

enum MockMode {
    Synthetic,
    Fixture(RawBars),
    Failing,
}

/// Offline price source for tests and local runs.
///
/// In synthetic mode every weekday gets a bar whose close and volume depend
/// only on (ticker, date), so overlapping ranges agree and repeated calls are
/// identical. Symbols that do not look like a listed ticker get no bars, and
/// nothing exists past `data_until`.
pub struct MockPriceProvider {
    mode: MockMode,
    data_until: NaiveDate,
    calls: AtomicUsize,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self::with_mode(MockMode::Synthetic)
    }

    /// Always answers `raw`, whatever is asked.
    pub fn fixture(raw: RawBars) -> Self {
        Self::with_mode(MockMode::Fixture(raw))
    }

    /// Always errors, like an unreachable upstream.
    pub fn failing() -> Self {
        Self::with_mode(MockMode::Failing)
    }

    fn with_mode(mode: MockMode) -> Self {
        Self {
            mode,
            data_until: NaiveDate::from_ymd_opt(2030, 12, 31).unwrap_or(NaiveDate::MAX),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_data_until(mut self, date: NaiveDate) -> Self {
        self.data_until = date;
        self
    }

    /// Number of `fetch_daily_bars` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn is_listed(ticker: &str) -> bool {
        (1..=5).contains(&ticker.len())
            && ticker.chars().all(|c| c.is_ascii_alphabetic() || c == '.')
    }

    fn seed(ticker: &str, date: Option<NaiveDate>) -> u64 {
        // FNV-1a, stable across builds
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let day = date.map(|d| d.num_days_from_ce()).unwrap_or(0);
        for byte in ticker.bytes().chain(day.to_le_bytes()) {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        hash
    }

    fn synthetic_series(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
        if !Self::is_listed(ticker) {
            return Vec::new();
        }

        let base = StdRng::seed_from_u64(Self::seed(ticker, None)).random_range(20.0..500.0);
        let last = end.min(self.data_until);
        let mut bars = Vec::new();
        let mut date = start;

        while date <= last {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let mut rng = StdRng::seed_from_u64(Self::seed(ticker, Some(date)));
                let close = base * (1.0 + rng.random_range(-0.03..0.03));
                let volume = rng.random_range(1_000_000.0..5_000_000.0_f64).round();
                bars.push(RawBar::new(date, close, volume));
            }
            date += Duration::days(1);
        }
        bars
    }
}

impl Default for MockPriceProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceProvider for MockPriceProvider {
    async fn fetch_daily_bars(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawBars> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.mode {
            MockMode::Failing => anyhow::bail!("mock provider unavailable"),
            MockMode::Fixture(raw) => Ok(raw.clone()),
            MockMode::Synthetic => {
                let mut series: Vec<(String, Vec<RawBar>)> = tickers
                    .iter()
                    .map(|t| (t.clone(), self.synthetic_series(t, start, end)))
                    .collect();
                debug!(
                    "MockPriceProvider: {} bars for {:?}",
                    series.iter().map(|(_, b)| b.len()).sum::<usize>(),
                    tickers
                );

                if series.len() == 1 {
                    let (ticker, bars) = series.remove(0);
                    Ok(RawBars::Single { ticker, bars })
                } else {
                    Ok(RawBars::ByTicker(series))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
