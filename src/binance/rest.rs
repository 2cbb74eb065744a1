//! Binance REST API client implementation

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::MarketDataClient;
use super::types::{RestApiError, Ticker24hrResponse, parse_klines};
use crate::market_data::{Candle, Period, SymbolName, TickerRow};

/// Default timeout applied to every request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Binance REST API client
#[derive(Debug, Clone)]
pub struct BinanceRestClient {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl BinanceRestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RestApiError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RestApiError::HttpStatus(status.as_u16(), body));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl MarketDataClient for BinanceRestClient {
    async fn fetch_snapshot(&self, symbol: &SymbolName) -> Result<TickerRow, RestApiError> {
        let url = format!("{}/api/v3/ticker/24hr?symbol={}", self.base_url, symbol);
        let response: Ticker24hrResponse = self.get_json(&url).await?;
        let row = response.into_row(*symbol)?;
        debug!("Fetched {} at {}", symbol, row.price);
        Ok(row)
    }

    async fn fetch_candles(
        &self,
        symbol: &SymbolName,
        period: Period,
    ) -> Result<Vec<Candle>, RestApiError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url,
            symbol,
            period.interval_code(),
            period.candle_limit()
        );
        let rows: Vec<Vec<Value>> = self.get_json(&url).await?;
        let candles = parse_klines(&rows);
        debug!(
            "Fetched {} candles for {} {} ({} rows received)",
            candles.len(),
            symbol,
            period.interval_code(),
            rows.len()
        );
        Ok(candles)
    }
}
