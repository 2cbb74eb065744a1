//! Binance API integration module
//!
//! REST calls and response parsing for the two requests the viewer needs:
//! the 24h ticker snapshot and the kline series.

pub mod mock;
pub mod rest;
pub mod types;

use async_trait::async_trait;

use crate::market_data::{Candle, Period, SymbolName, TickerRow};

// Re-export commonly used types
pub use rest::BinanceRestClient;
pub use types::RestApiError;

/// Source of ticker snapshots and candle series.
///
/// Implementations bound every call by their own timeout and report
/// malformed responses as errors rather than panicking.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Latest 24h statistics for one symbol
    async fn fetch_snapshot(&self, symbol: &SymbolName) -> Result<TickerRow, RestApiError>;

    /// Candles for `symbol` at `period`, oldest first
    async fn fetch_candles(
        &self,
        symbol: &SymbolName,
        period: Period,
    ) -> Result<Vec<Candle>, RestApiError>;
}
