//! Runtime context shared by the refresh loop and the render/input loop

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::binance::{BinanceRestClient, MarketDataClient};
use crate::config::{Settings, Watchlist};
use crate::market_data::{FetchStatus, RefreshLoop, StatusCell, TickerStore};
use crate::metrics::RefreshMetrics;

/// Everything both loops need, built once at startup
pub struct RuntimeContext {
    settings: Settings,
    watchlist: Watchlist,
    store: Arc<TickerStore>,
    status: Arc<StatusCell>,
    metrics: Arc<RefreshMetrics>,
    client: Arc<dyn MarketDataClient>,
    shutdown: CancellationToken,
}

impl RuntimeContext {
    /// Create a context around an arbitrary market data client
    pub fn new(
        settings: Settings,
        watchlist: Watchlist,
        client: Arc<dyn MarketDataClient>,
    ) -> Result<Self> {
        if watchlist.is_empty() {
            anyhow::bail!("Watchlist is empty; nothing to display");
        }

        let store = TickerStore::new(watchlist.symbols())
            .context("Failed to allocate the ticker store")?;
        info!("Runtime created for {} symbols", store.len());

        Ok(Self {
            settings,
            watchlist,
            store: Arc::new(store),
            status: Arc::new(StatusCell::new(FetchStatus::Normal)),
            metrics: Arc::new(RefreshMetrics::new()),
            client,
            shutdown: CancellationToken::new(),
        })
    }

    /// Create a context talking to the Binance REST API
    pub fn with_rest_client(settings: Settings, watchlist: Watchlist) -> Result<Self> {
        let client =
            BinanceRestClient::with_timeout(&settings.binance.rest_url, settings.request_timeout());
        Self::new(settings, watchlist, Arc::new(client))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn watchlist(&self) -> &Watchlist {
        &self.watchlist
    }

    pub fn store(&self) -> &Arc<TickerStore> {
        &self.store
    }

    pub fn status(&self) -> &Arc<StatusCell> {
        &self.status
    }

    pub fn metrics(&self) -> &Arc<RefreshMetrics> {
        &self.metrics
    }

    pub fn client(&self) -> &Arc<dyn MarketDataClient> {
        &self.client
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Build the single refresh loop writing into this context's store
    pub fn refresh_loop(&self) -> RefreshLoop {
        RefreshLoop::new(
            self.client.clone(),
            self.store.clone(),
            self.watchlist.symbols().to_vec(),
            self.status.clone(),
            self.metrics.clone(),
            self.shutdown.clone(),
        )
        .with_interval(self.settings.refresh_interval())
    }

    /// Bridge Ctrl-C and SIGTERM to the shutdown token
    pub fn install_signal_handlers(&self) -> JoinHandle<()> {
        let shutdown = self.shutdown.clone();
        tokio::spawn(bridge_signal(shutdown, wait_for_signal()))
    }

    /// Ask both loops to stop at their next poll point
    pub fn request_shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Shutdown requested");
            self.shutdown.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }
}

/// Cancel `shutdown` once `signal` fires. A handler that fails to install
/// leaves the token alone; the quit keys still work.
async fn bridge_signal<F>(shutdown: CancellationToken, signal: F)
where
    F: Future<Output = std::io::Result<&'static str>>,
{
    tokio::select! {
        _ = shutdown.cancelled() => {}
        signal = signal => match signal {
            Ok(name) => {
                info!("Received {}, shutting down", name);
                shutdown.cancel();
            }
            Err(e) => warn!("Signal handler failed: {}", e),
        },
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "SIGINT"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await.map(|_| "Ctrl-C")
}
