//! Background refresh loop
//!
//! Fetches every watchlist symbol into a private scratch buffer, then
//! publishes the rows that succeeded into the shared store under a single
//! lock acquisition. Failed symbols keep their last good row.

use std::collections::TryReserveError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::status::{FetchStatus, StatusCell};
use super::store::TickerStore;
use super::ticker::{SymbolName, TickerRow};
use crate::binance::MarketDataClient;
use crate::metrics::RefreshMetrics;

/// Delay between refresh cycles
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Granularity at which the sleep between cycles observes shutdown
const SHUTDOWN_POLL: Duration = Duration::from_secs(1);

/// Failures that stop the refresh loop
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("failed to allocate refresh buffers for {symbols} symbols: {source}")]
    Allocation {
        symbols: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Outcome of one pass over the watchlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
    /// Shutdown was observed before every symbol was fetched
    pub interrupted: bool,
}

/// Sole writer of the shared ticker store
pub struct RefreshLoop {
    client: Arc<dyn MarketDataClient>,
    store: Arc<TickerStore>,
    symbols: Vec<SymbolName>,
    status: Arc<StatusCell>,
    metrics: Arc<RefreshMetrics>,
    shutdown: CancellationToken,
    interval: Duration,
    scratch: Vec<TickerRow>,
    updated: Vec<bool>,
    /// An initial fetch already covered the first cycle
    primed: bool,
}

impl RefreshLoop {
    pub fn new(
        client: Arc<dyn MarketDataClient>,
        store: Arc<TickerStore>,
        symbols: Vec<SymbolName>,
        status: Arc<StatusCell>,
        metrics: Arc<RefreshMetrics>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            client,
            store,
            symbols,
            status,
            metrics,
            shutdown,
            interval: DEFAULT_REFRESH_INTERVAL,
            scratch: Vec::new(),
            updated: Vec::new(),
            primed: false,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn ensure_scratch(&mut self) -> Result<(), RefreshError> {
        let n = self.symbols.len();
        if self.scratch.len() != n {
            let alloc_err = |source| RefreshError::Allocation { symbols: n, source };
            self.scratch.clear();
            self.updated.clear();
            self.scratch.try_reserve_exact(n).map_err(alloc_err)?;
            self.updated.try_reserve_exact(n).map_err(alloc_err)?;
            self.scratch
                .extend(self.symbols.iter().copied().map(TickerRow::empty));
            self.updated.resize(n, false);
        }
        self.updated.fill(false);
        Ok(())
    }

    fn release_scratch(&mut self) {
        self.scratch = Vec::new();
        self.updated = Vec::new();
    }

    /// Fetch every symbol once and publish the successes.
    ///
    /// Shutdown is checked before each fetch; whatever was fetched before
    /// the interruption is still published.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, RefreshError> {
        self.status.set(FetchStatus::Fetching);
        let started = Instant::now();
        self.ensure_scratch()?;

        let mut report = CycleReport::default();
        for (idx, symbol) in self.symbols.iter().enumerate() {
            if self.shutdown.is_cancelled() {
                report.interrupted = true;
                break;
            }
            report.attempted += 1;

            match self.client.fetch_snapshot(symbol).await {
                Ok(row) => {
                    // The slot owns the symbol, whatever the upstream echoed.
                    self.scratch[idx] = TickerRow {
                        symbol: *symbol,
                        ..row
                    };
                    self.updated[idx] = true;
                }
                Err(e) => {
                    warn!("Failed to refresh {}: {}", symbol, e);
                    report.failed += 1;
                }
            }
        }

        report.updated = self.store.publish_updated(&self.scratch, &self.updated);
        self.status.set(if report.failed > 0 {
            FetchStatus::NetworkError
        } else {
            FetchStatus::Normal
        });
        self.metrics.record_cycle(report.failed, started.elapsed());

        debug!(
            "Refresh cycle: {} attempted, {} updated, {} failed{}",
            report.attempted,
            report.updated,
            report.failed,
            if report.interrupted { " (interrupted)" } else { "" }
        );
        Ok(report)
    }

    /// Run the first cycle ahead of the UI; the loop then starts with a sleep
    pub async fn initial_fetch(&mut self) -> Result<CycleReport, RefreshError> {
        let report = self.run_cycle().await?;
        self.primed = true;
        info!(
            "Initial fetch complete: {}/{} symbols updated",
            report.updated,
            self.symbols.len()
        );
        Ok(report)
    }

    /// Sleep for one interval; returns `false` if shutdown was requested
    async fn sleep_interval(&self) -> bool {
        let mut remaining = self.interval;
        while !remaining.is_zero() {
            let slice = remaining.min(SHUTDOWN_POLL);
            tokio::select! {
                _ = self.shutdown.cancelled() => return false,
                _ = tokio::time::sleep(slice) => {}
            }
            remaining -= slice;
        }
        !self.shutdown.is_cancelled()
    }

    /// Unrecoverable failure: flag the footer and stop the whole application
    fn abort(&self, err: RefreshError) {
        self.status.set(FetchStatus::NetworkError);
        error!("Refresh loop cannot continue: {}", err);
        self.shutdown.cancel();
    }

    /// Refresh until shutdown is requested
    pub async fn run(mut self) {
        info!(
            "Refresh loop started: {} symbols every {:?}",
            self.symbols.len(),
            self.interval
        );

        while !self.shutdown.is_cancelled() {
            if self.primed {
                self.primed = false;
            } else if let Err(e) = self.run_cycle().await {
                self.abort(e);
                break;
            }

            if !self.sleep_interval().await {
                break;
            }
        }

        self.release_scratch();
        info!("Refresh loop stopped");
    }
}
