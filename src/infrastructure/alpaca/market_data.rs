use super::common::{AlpacaBarsResponse, DEFAULT_DATA_URL, DEFAULT_FEED};
use crate::domain::errors::MarketDataError;
use crate::domain::market::{RawBar, RawBars};
use crate::domain::ports::PriceProvider;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, HttpClientSettings, build_url_with_query,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use std::collections::HashMap;
use tracing::{debug, error, info};

const PAGE_LIMIT: &str = "10000";
const MAX_PAGES: usize = 100;

/// Daily bars from the Alpaca market data REST API (`/v2/stocks/bars`).
///
/// All tickers go into one multi-symbol request; pages are followed through
/// `next_page_token`.
pub struct AlpacaPriceProvider {
    client: ClientWithMiddleware,
    api_key: String,
    api_secret: String,
    data_base_url: String,
    feed: String,
}

impl AlpacaPriceProvider {
    pub fn builder() -> AlpacaPriceProviderBuilder {
        AlpacaPriceProviderBuilder::default()
    }

    fn bars_url(&self) -> String {
        format!("{}/v2/stocks/bars", self.data_base_url.trim_end_matches('/'))
    }

    async fn fetch_page(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
        page_token: Option<&str>,
    ) -> Result<AlpacaBarsResponse> {
        let symbols = tickers.join(",");
        let start_s = start.format("%Y-%m-%d").to_string();
        let end_s = end.format("%Y-%m-%d").to_string();
        let mut query_params: Vec<(&str, &str)> = vec![
            ("symbols", symbols.as_str()),
            ("timeframe", "1Day"),
            ("start", start_s.as_str()),
            ("end", end_s.as_str()),
            ("adjustment", "all"),
            ("limit", PAGE_LIMIT),
            ("feed", self.feed.as_str()),
        ];
        if let Some(token) = page_token {
            query_params.push(("page_token", token));
        }

        let url_with_query = build_url_with_query(&self.bars_url(), &query_params);
        let response = self
            .client
            .get(&url_with_query)
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
            .send()
            .await
            .context("Failed to fetch bars from Alpaca")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(
                "AlpacaPriceProvider: API error {} for {}: {}",
                status, symbols, body
            );
            return Err(MarketDataError::Api {
                provider: "Alpaca",
                status: status.as_u16(),
                body,
            }
            .into());
        }

        response
            .json()
            .await
            .context("Failed to parse Alpaca bars response")
    }
}

#[async_trait]
impl PriceProvider for AlpacaPriceProvider {
    async fn fetch_daily_bars(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawBars> {
        let mut by_ticker: HashMap<String, Vec<RawBar>> = HashMap::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_PAGES {
            let body = self
                .fetch_page(tickers, start, end, page_token.as_deref())
                .await?;

            for (symbol, bars) in body.bars.unwrap_or_default() {
                by_ticker
                    .entry(symbol)
                    .or_default()
                    .extend(bars.iter().filter_map(|b| b.to_raw_bar()));
            }

            debug!("AlpacaPriceProvider: page {} fetched", page + 1);
            page_token = body.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
        }

        // Keep the requested order; the API answers with a map
        let series: Vec<(String, Vec<RawBar>)> = tickers
            .iter()
            .filter_map(|t| by_ticker.remove(t).map(|bars| (t.clone(), bars)))
            .collect();

        info!(
            "AlpacaPriceProvider: {} bars for {}/{} tickers",
            series.iter().map(|(_, b)| b.len()).sum::<usize>(),
            series.len(),
            tickers.len()
        );

        Ok(RawBars::ByTicker(series))
    }

    fn name(&self) -> &str {
        "alpaca"
    }
}

#[derive(Default)]
pub struct AlpacaPriceProviderBuilder {
    api_key: Option<String>,
    api_secret: Option<String>,
    data_base_url: Option<String>,
    feed: Option<String>,
    http: Option<HttpClientSettings>,
}

impl AlpacaPriceProviderBuilder {
    pub fn api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn api_secret(mut self, api_secret: String) -> Self {
        self.api_secret = Some(api_secret);
        self
    }

    pub fn data_base_url(mut self, data_base_url: String) -> Self {
        self.data_base_url = Some(data_base_url);
        self
    }

    pub fn feed(mut self, feed: String) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn http_settings(mut self, settings: HttpClientSettings) -> Self {
        self.http = Some(settings);
        self
    }

    pub fn build(self) -> Result<AlpacaPriceProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(MarketDataError::MissingCredentials {
                provider: "Alpaca",
                variable: "ALPACA_API_KEY",
            })?;
        let api_secret = self
            .api_secret
            .filter(|k| !k.is_empty())
            .ok_or(MarketDataError::MissingCredentials {
                provider: "Alpaca",
                variable: "ALPACA_SECRET_KEY",
            })?;

        Ok(AlpacaPriceProvider {
            client: HttpClientFactory::create_client_with(self.http.unwrap_or_default()),
            api_key,
            api_secret,
            data_base_url: self
                .data_base_url
                .unwrap_or_else(|| DEFAULT_DATA_URL.to_string()),
            feed: self
                .feed
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| DEFAULT_FEED.to_string()),
        })
    }
}
