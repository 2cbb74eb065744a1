//! Chart session: one symbol's candle series under user navigation
//!
//! The buffer is replaced only after a new series has been fetched, so a
//! failed reload leaves the previous period, candles and cursor untouched.

use tracing::{debug, info, warn};

use crate::binance::{MarketDataClient, RestApiError};
use crate::market_data::{Candle, Period, SymbolName, TickerStore};

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("no symbol at watchlist position {0}")]
    NotFound(usize),
    #[error("failed to fetch candles: {0}")]
    Fetch(#[from] RestApiError),
    #[error("no chart is open")]
    NotOpen,
}

/// State of an open chart
#[derive(Debug, Clone)]
pub struct OpenChart {
    symbol: SymbolName,
    origin_index: usize,
    candles: Vec<Candle>,
    cursor: Option<usize>,
}

impl OpenChart {
    fn newest(&self) -> Option<usize> {
        self.candles.len().checked_sub(1)
    }

    /// Fetch a fresh series and put the cursor back where the user left it.
    ///
    /// A cursor on the newest candle moves to the new newest one; a cursor on
    /// an older candle follows its open time, falling back to the newest.
    async fn reload(
        &mut self,
        client: &dyn MarketDataClient,
        period: Period,
        follow_latest: bool,
    ) -> Result<(), RestApiError> {
        let retained = self
            .cursor
            .and_then(|idx| self.candles.get(idx).map(|c| (c.open_time, Some(idx) == self.newest())));

        let candles = client.fetch_candles(&self.symbol, period).await?;
        self.candles = candles;

        let newest = self.newest();
        self.cursor = match retained {
            _ if follow_latest => newest,
            None | Some((_, true)) => newest,
            Some((open_time, false)) => self
                .candles
                .iter()
                .position(|c| c.open_time == open_time)
                .or(newest),
        };
        Ok(())
    }
}

/// Chart mode state; the period survives across sessions
#[derive(Debug, Clone)]
pub struct ChartSession {
    open: Option<OpenChart>,
    period: Period,
    follow_latest: bool,
}

impl Default for ChartSession {
    fn default() -> Self {
        Self {
            open: None,
            period: Period::default(),
            follow_latest: true,
        }
    }
}

impl ChartSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn follow_latest(&self) -> bool {
        self.follow_latest
    }

    pub fn symbol(&self) -> Option<SymbolName> {
        self.open.as_ref().map(|c| c.symbol)
    }

    pub fn origin_index(&self) -> Option<usize> {
        self.open.as_ref().map(|c| c.origin_index)
    }

    pub fn candles(&self) -> &[Candle] {
        self.open.as_ref().map_or(&[], |c| c.candles.as_slice())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.open.as_ref().and_then(|c| c.cursor)
    }

    pub fn selected_candle(&self) -> Option<&Candle> {
        let chart = self.open.as_ref()?;
        chart.cursor.and_then(|idx| chart.candles.get(idx))
    }

    /// Open the chart for the watchlist entry at `origin_index`.
    ///
    /// The symbol is copied out of the store before any network call. On
    /// failure the session stays closed.
    pub async fn open(
        &mut self,
        client: &dyn MarketDataClient,
        store: &TickerStore,
        origin_index: usize,
    ) -> Result<(), ChartError> {
        let symbol = store
            .symbol_at(origin_index)
            .ok_or(ChartError::NotFound(origin_index))?;

        let candles = client.fetch_candles(&symbol, self.period).await?;
        let cursor = candles.len().checked_sub(1);
        info!(
            "Opened {} chart for {} ({} candles)",
            self.period.interval_code(),
            symbol,
            candles.len()
        );
        self.open = Some(OpenChart {
            symbol,
            origin_index,
            candles,
            cursor,
        });
        Ok(())
    }

    /// Step to the neighbouring period, keeping everything as it was on failure
    pub async fn change_period(
        &mut self,
        client: &dyn MarketDataClient,
        step: isize,
    ) -> Result<Period, ChartError> {
        let chart = self.open.as_mut().ok_or(ChartError::NotOpen)?;
        let next = self.period.offset(step);

        let candles = match client.fetch_candles(&chart.symbol, next).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!(
                    "Keeping {} chart for {}: {}",
                    self.period.interval_code(),
                    chart.symbol,
                    e
                );
                return Err(e.into());
            }
        };

        chart.candles = candles;
        chart.cursor = match (chart.cursor, chart.newest()) {
            (Some(idx), Some(newest)) => Some(idx.min(newest)),
            (None, newest) => newest,
            (_, None) => None,
        };
        self.period = next;
        debug!("Chart period changed to {}", next.interval_code());
        Ok(next)
    }

    /// Reload when the newest candle has closed at `now` (unix seconds).
    ///
    /// Returns whether a reload happened. Cheap when nothing has expired.
    pub async fn refresh_if_expired(
        &mut self,
        client: &dyn MarketDataClient,
        now: u64,
    ) -> Result<bool, ChartError> {
        let Some(chart) = self.open.as_mut() else {
            return Ok(false);
        };
        let expired = chart.candles.last().is_some_and(|c| c.is_expired(now));
        if !expired {
            return Ok(false);
        }

        chart.reload(client, self.period, false).await?;
        debug!("Reloaded expired {} candles for {}", self.period.interval_code(), chart.symbol);
        Ok(true)
    }

    /// Unconditional reload; `follow_latest` snaps the cursor to the newest candle
    pub async fn force_refresh(
        &mut self,
        client: &dyn MarketDataClient,
        follow_latest: bool,
    ) -> Result<(), ChartError> {
        let chart = self.open.as_mut().ok_or(ChartError::NotOpen)?;
        chart.reload(client, self.period, follow_latest).await?;
        info!("Refreshed {} chart for {}", self.period.interval_code(), chart.symbol);
        Ok(())
    }

    /// Patch the in-progress candle with the latest ticker price.
    ///
    /// Returns `false` when nothing was changed.
    pub fn apply_live_price(&mut self, store: &TickerStore) -> bool {
        let Some(chart) = self.open.as_mut() else {
            return false;
        };
        let Some(row) = store.find_row(Some(chart.origin_index), &chart.symbol) else {
            return false;
        };
        let price = row.price;
        if price.is_nan() || price <= 0.0 {
            return false;
        }
        let Some(last) = chart.candles.last_mut() else {
            return false;
        };

        if price > last.high {
            last.high = price;
            last.high_text.clear();
        }
        if last.low == 0.0 || price < last.low {
            last.low = price;
            last.low_text.clear();
        }
        last.close = price;
        last.close_text.clear();
        true
    }

    /// Move the cursor by `delta` candles, clamped; any move clears follow-latest
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let Some(chart) = self.open.as_mut() else {
            return false;
        };
        let Some(newest) = chart.newest() else {
            return false;
        };
        let current = chart.cursor.unwrap_or(newest);
        let target = current.saturating_add_signed(delta).min(newest);
        if Some(target) == chart.cursor {
            return false;
        }
        chart.cursor = Some(target);
        self.follow_latest = false;
        true
    }

    /// Select a candle directly, e.g. from a mouse click
    pub fn select(&mut self, index: usize) -> bool {
        let Some(chart) = self.open.as_mut() else {
            return false;
        };
        let Some(newest) = chart.newest() else {
            return false;
        };
        chart.cursor = Some(index.min(newest));
        self.follow_latest = false;
        true
    }

    pub fn toggle_follow(&mut self) {
        self.follow_latest = !self.follow_latest;
        if self.follow_latest {
            self.snap_to_latest();
        }
    }

    pub fn snap_to_latest(&mut self) {
        if let Some(chart) = self.open.as_mut() {
            chart.cursor = chart.newest();
        }
    }

    /// Drop the buffer and re-enable follow-latest for the next chart
    pub fn close(&mut self) {
        if let Some(chart) = self.open.take() {
            debug!("Closed chart for {}", chart.symbol);
        }
        self.follow_latest = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binance::mock::{MockMarketDataClient, mock_row};

    fn sym(name: &str) -> SymbolName {
        SymbolName::new(name).unwrap()
    }

    /// `count` daily candles starting at `start` (seconds)
    fn series(start: u64, count: usize) -> Vec<Candle> {
        (0..count as u64)
            .map(|i| {
                let open = start + i * 86_400;
                Candle::new(open, open + 86_399, 100.0, 110.0, 90.0, 105.0)
            })
            .collect()
    }

    fn setup() -> (MockMarketDataClient, TickerStore) {
        let client = MockMarketDataClient::new();
        let symbols = vec![sym("BTCUSDT"), sym("ETHUSDT")];
        let store = TickerStore::new(&symbols).unwrap();
        client.set_candles(sym("BTCUSDT"), Period::OneDay, series(0, 5));
        (client, store)
    }

    #[tokio::test]
    async fn test_open_selects_newest_candle() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();

        assert_eq!(chart.symbol(), Some(sym("BTCUSDT")));
        assert_eq!(chart.cursor(), Some(4));
        assert!(chart.follow_latest());
    }

    #[tokio::test]
    async fn test_open_out_of_range_is_not_found() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        let err = chart.open(&client, &store, 7).await.unwrap_err();

        assert!(matches!(err, ChartError::NotFound(7)));
        assert!(!chart.is_open());
        assert_eq!(client.candle_calls(), 0);
    }

    #[tokio::test]
    async fn test_open_failure_stays_closed() {
        let (client, store) = setup();
        client.fail_candles(true);
        let mut chart = ChartSession::new();

        assert!(matches!(
            chart.open(&client, &store, 0).await,
            Err(ChartError::Fetch(_))
        ));
        assert!(!chart.is_open());
    }

    #[tokio::test]
    async fn test_change_period_failure_rolls_back() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();
        chart.move_cursor(-2);
        let before = (chart.period(), chart.candles().to_vec(), chart.cursor());

        client.fail_candles(true);
        assert!(chart.change_period(&client, 1).await.is_err());

        assert_eq!(before, (chart.period(), chart.candles().to_vec(), chart.cursor()));
    }

    #[tokio::test]
    async fn test_change_period_wraps_and_clamps_cursor() {
        let (client, store) = setup();
        client.set_candles(sym("BTCUSDT"), Period::FourHours, series(0, 2));
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();

        let period = chart.change_period(&client, -1).await.unwrap();
        assert_eq!(period, Period::FourHours);
        assert_eq!(chart.cursor(), Some(1));
    }

    #[tokio::test]
    async fn test_expired_refresh_restores_historical_selection() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();
        chart.select(1);
        let selected = chart.selected_candle().unwrap().open_time;

        // Window rolled forward by two candles; the selected one is now at index 0.
        client.set_candles(sym("BTCUSDT"), Period::OneDay, series(86_400, 6));
        let now = chart.candles().last().unwrap().close_time;
        assert!(chart.refresh_if_expired(&client, now).await.unwrap());

        assert_eq!(chart.cursor(), Some(0));
        assert_eq!(chart.selected_candle().unwrap().open_time, selected);
    }

    #[tokio::test]
    async fn test_expired_refresh_follows_newest() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();

        client.set_candles(sym("BTCUSDT"), Period::OneDay, series(0, 6));
        let now = chart.candles().last().unwrap().close_time;
        assert!(chart.refresh_if_expired(&client, now).await.unwrap());
        assert_eq!(chart.cursor(), Some(5));
    }

    #[tokio::test]
    async fn test_refresh_not_expired_is_noop() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();

        let now = chart.candles().last().unwrap().close_time - 1;
        assert!(!chart.refresh_if_expired(&client, now).await.unwrap());
        assert_eq!(client.candle_calls(), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_falls_back_to_newest() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();
        chart.select(0);

        client.set_candles(sym("BTCUSDT"), Period::OneDay, series(10 * 86_400, 3));
        chart.force_refresh(&client, false).await.unwrap();
        assert_eq!(chart.cursor(), Some(2));
    }

    #[tokio::test]
    async fn test_live_price_patches_last_candle() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();

        store.publish(0, mock_row(sym("BTCUSDT"), 120.0));
        assert!(chart.apply_live_price(&store));
        let last = *chart.candles().last().unwrap();
        assert_eq!((last.high, last.low, last.close), (120.0, 90.0, 120.0));

        store.publish(0, mock_row(sym("BTCUSDT"), 80.0));
        chart.apply_live_price(&store);
        let last = *chart.candles().last().unwrap();
        assert_eq!((last.high, last.low, last.close), (120.0, 80.0, 80.0));
        assert!(last.close_text.is_empty());

        // Older candles are never touched.
        assert_eq!(chart.candles()[0].close, 105.0);
    }

    #[tokio::test]
    async fn test_live_price_ignores_missing_price() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();

        assert!(!chart.apply_live_price(&store));
        assert_eq!(chart.candles().last().unwrap().close, 105.0);
    }

    #[tokio::test]
    async fn test_cursor_navigation_and_follow() {
        let (client, store) = setup();
        let mut chart = ChartSession::new();
        chart.open(&client, &store, 0).await.unwrap();

        assert!(!chart.move_cursor(1));
        assert!(chart.follow_latest());
        assert!(chart.move_cursor(-10));
        assert_eq!(chart.cursor(), Some(0));
        assert!(!chart.follow_latest());

        chart.toggle_follow();
        assert_eq!(chart.cursor(), Some(4));
        assert!(chart.follow_latest());

        chart.toggle_follow();
        chart.close();
        assert!(!chart.is_open());
        assert!(chart.follow_latest());
        assert_eq!(chart.cursor(), None);
    }
}
