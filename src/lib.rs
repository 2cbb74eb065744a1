//! CTicker Library
//!
//! Terminal price board for Binance spot symbols with drill-down
//! candlestick charts, refreshed over the REST API.

pub mod binance;
pub mod config;
pub mod market_data;
pub mod metrics;
pub mod session;
pub mod ui;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::LogConfig;

/// Application result type for consistent error handling
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Log file name prefix inside the log directory
pub const LOG_FILE_PREFIX: &str = "cticker.log";

/// Initialize tracing subscriber writing to a daily rolling file.
///
/// The terminal belongs to the UI, so nothing is logged to stdout. Keep the
/// returned guard alive until exit to flush buffered lines.
pub fn init_logging(log: &LogConfig) -> Result<WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(&log.directory).with_context(|| {
        format!("Failed to create log directory: {}", log.directory.display())
    })?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log.directory, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("cticker={}", log.level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
