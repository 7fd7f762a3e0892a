use crate::domain::errors::MarketDataError;
use crate::domain::market::{RawBars, RawRow};
use crate::domain::ports::PriceProvider;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, HttpClientSettings, build_url_with_query,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "http://api.marketstack.com/v1";
const PAGE_LIMIT: usize = 1000;
const MAX_PAGES: usize = 50;

#[derive(Debug, Deserialize)]
struct EodPagination {
    #[serde(default)]
    count: usize,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct EodRow {
    symbol: Option<String>,
    date: String,
    close: Option<f64>,
    volume: Option<f64>,
}

impl EodRow {
    /// Marketstack stamps rows as `2024-01-02T00:00:00+0000`.
    fn trading_date(&self) -> Option<NaiveDate> {
        self.date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Deserialize)]
struct EodResponse {
    pagination: Option<EodPagination>,
    #[serde(default)]
    data: Vec<EodRow>,
}

/// End-of-day prices from Marketstack (`/eod`), one request series per
/// ticker so a bad symbol does not sink the others.
pub struct MarketstackPriceProvider {
    client: ClientWithMiddleware,
    api_key: String,
    base_url: String,
}

impl MarketstackPriceProvider {
    pub fn new(api_key: String, base_url: Option<String>, http: HttpClientSettings) -> Result<Self> {
        if api_key.is_empty() {
            return Err(MarketDataError::MissingCredentials {
                provider: "Marketstack",
                variable: "MARKETSTACK_API_KEY",
            }
            .into());
        }
        Ok(Self {
            client: HttpClientFactory::create_client_with(http),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }

    fn eod_url(&self) -> String {
        format!("{}/eod", self.base_url.trim_end_matches('/'))
    }

    async fn fetch_ticker(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawRow>> {
        let mut rows = Vec::new();
        let mut offset = 0usize;

        for _ in 0..MAX_PAGES {
            let params = [
                ("access_key", self.api_key.clone()),
                ("symbols", ticker.to_string()),
                ("date_from", start.to_string()),
                ("date_to", end.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
                ("offset", offset.to_string()),
            ];
            let response = self
                .client
                .get(build_url_with_query(&self.eod_url(), &params))
                .send()
                .await
                .with_context(|| format!("Failed to fetch Marketstack EOD for {}", ticker))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(MarketDataError::Api {
                    provider: "Marketstack",
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            let page: EodResponse = response
                .json()
                .await
                .context("Failed to parse Marketstack EOD response")?;
            let page_len = page.data.len();

            rows.extend(page.data.into_iter().filter_map(|row| {
                let date = row.trading_date()?;
                Some(RawRow {
                    ticker: row.symbol.unwrap_or_else(|| ticker.to_string()),
                    date,
                    close: row.close,
                    volume: row.volume,
                })
            }));

            offset += page_len;
            let total = page.pagination.map(|p| p.total.max(p.count)).unwrap_or(0);
            if page_len == 0 || offset >= total {
                break;
            }
        }

        debug!("MarketstackPriceProvider: {} rows for {}", rows.len(), ticker);
        Ok(rows)
    }
}

#[async_trait]
impl PriceProvider for MarketstackPriceProvider {
    async fn fetch_daily_bars(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawBars> {
        let mut rows = Vec::new();
        let mut last_error = None;

        for ticker in tickers {
            match self.fetch_ticker(ticker, start, end).await {
                Ok(ticker_rows) => rows.extend(ticker_rows),
                Err(e) => {
                    warn!("MarketstackPriceProvider: {} failed: {:#}", ticker, e);
                    last_error = Some(e);
                }
            }
        }

        // Only surface the failure when nothing at all came back
        if rows.is_empty() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        info!(
            "MarketstackPriceProvider: {} rows for {} tickers",
            rows.len(),
            tickers.len()
        );
        Ok(RawBars::Long(rows))
    }

    fn name(&self) -> &str {
        "marketstack"
    }
}
