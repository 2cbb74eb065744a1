//! Scriptable in-memory market data client
//! Used for testing the refresh loop and chart session without network access

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::MarketDataClient;
use super::types::RestApiError;
use crate::market_data::{Candle, Period, SymbolName, TickerRow};

#[derive(Default)]
struct MockState {
    tickers: HashMap<SymbolName, TickerRow>,
    failing: HashSet<SymbolName>,
    candles: HashMap<(SymbolName, Period), Vec<Candle>>,
    candles_fail: bool,
    cancel_after: Option<(usize, CancellationToken)>,
    snapshot_delay: Duration,
}

/// Mock client returning scripted rows and candle series
#[derive(Default)]
pub struct MockMarketDataClient {
    state: Mutex<MockState>,
    snapshot_calls: AtomicUsize,
    candle_calls: AtomicUsize,
}

impl MockMarketDataClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Script the row returned for `row.symbol`
    pub fn set_row(&self, row: TickerRow) {
        self.state().tickers.insert(row.symbol, row);
    }

    /// Script a row carrying only a price
    pub fn set_price(&self, symbol: SymbolName, price: f64) {
        self.set_row(mock_row(symbol, price));
    }

    /// Make every snapshot fetch for `symbol` time out
    pub fn fail_symbol(&self, symbol: SymbolName) {
        self.state().failing.insert(symbol);
    }

    pub fn recover_symbol(&self, symbol: SymbolName) {
        self.state().failing.remove(&symbol);
    }

    pub fn set_candles(&self, symbol: SymbolName, period: Period, candles: Vec<Candle>) {
        self.state().candles.insert((symbol, period), candles);
    }

    /// Make every candle fetch fail (or succeed again)
    pub fn fail_candles(&self, fail: bool) {
        self.state().candles_fail = fail;
    }

    /// Cancel `token` once the `n`th snapshot call has been served
    pub fn cancel_on_snapshot_call(&self, n: usize, token: CancellationToken) {
        self.state().cancel_after = Some((n, token));
    }

    /// Hold every snapshot response for `delay` before answering
    pub fn set_snapshot_delay(&self, delay: Duration) {
        self.state().snapshot_delay = delay;
    }

    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn candle_calls(&self) -> usize {
        self.candle_calls.load(Ordering::SeqCst)
    }
}

/// Row with a price and a non-zero timestamp
pub fn mock_row(symbol: SymbolName, price: f64) -> TickerRow {
    TickerRow {
        symbol,
        price,
        high_24h: price,
        low_24h: price,
        timestamp: 1,
        ..TickerRow::default()
    }
}

#[async_trait]
impl MarketDataClient for MockMarketDataClient {
    async fn fetch_snapshot(&self, symbol: &SymbolName) -> Result<TickerRow, RestApiError> {
        let call = self.snapshot_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.state().snapshot_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let state = self.state();

        if let Some((n, token)) = &state.cancel_after {
            if call >= *n {
                token.cancel();
            }
        }

        if state.failing.contains(symbol) {
            return Err(RestApiError::Timeout);
        }
        state
            .tickers
            .get(symbol)
            .copied()
            .ok_or_else(|| RestApiError::HttpStatus(400, format!("unknown symbol {symbol}")))
    }

    async fn fetch_candles(
        &self,
        symbol: &SymbolName,
        period: Period,
    ) -> Result<Vec<Candle>, RestApiError> {
        self.candle_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state();

        if state.candles_fail {
            return Err(RestApiError::HttpRequest("network unreachable".to_string()));
        }
        state
            .candles
            .get(&(*symbol, period))
            .cloned()
            .ok_or_else(|| RestApiError::HttpStatus(400, format!("no candles for {symbol}")))
    }
}
