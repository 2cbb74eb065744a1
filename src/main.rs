use anyhow::{Context, Result};
use colored::Colorize;
use crossterm::event::EventStream;
use tracing::{info, warn};

use cticker::config::{Settings, Watchlist};
use cticker::init_logging;
use cticker::session::RuntimeContext;
use cticker::ui::{UIManager, initial_fetch_or_quit};
use cticker::ui::tui::TerminalSurface;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{} {:#}", "cticker:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let mut warnings = Vec::new();
    let settings = match Settings::default_path() {
        Some(path) => Settings::load_or_default(path, &mut warnings),
        None => {
            warnings.push("No config directory available, using default settings".to_string());
            Settings::default()
        }
    };

    let _log_guard = init_logging(&settings.log)?;
    info!("CTicker starting...");
    for warning in &warnings {
        warn!("{}", warning);
    }

    let watchlist_path = match settings.watchlist_path.clone() {
        Some(path) => path,
        None => Watchlist::default_path()?,
    };
    let watchlist = Watchlist::load_from(&watchlist_path)
        .with_context(|| format!("Cannot load watchlist {}", watchlist_path.display()))?;
    info!(
        "Loaded {} symbols from {}",
        watchlist.len(),
        watchlist_path.display()
    );

    let context = RuntimeContext::with_rest_client(settings, watchlist)?;
    let signal_task = context.install_signal_handlers();

    let mut surface = TerminalSurface::new()
        .map_err(|e| anyhow::anyhow!("Failed to initialise terminal: {}", e))?;
    surface
        .draw_splash(context.watchlist().len())
        .map_err(|e| anyhow::anyhow!("Failed to render frame: {}", e))?;

    let mut events = EventStream::new();
    let mut refresh = context.refresh_loop();
    let shutdown = context.shutdown_token();
    let primed = initial_fetch_or_quit(&mut refresh, &mut events, &shutdown).await?;

    let Some(report) = primed else {
        restore_terminal(surface)?;
        if let Err(e) = signal_task.await {
            warn!("Signal task ended abnormally: {}", e);
        }
        info!("CTicker stopped before the first snapshot");
        return Ok(());
    };
    info!(
        "Initial snapshot: {}/{} symbols updated",
        report.updated, report.attempted
    );
    let refresh_task = tokio::spawn(refresh.run());

    let mut ui = UIManager::new(&context, surface);
    let result = ui.run(events).await;

    context.request_shutdown();
    restore_terminal(ui.into_surface())?;

    if let Err(e) = refresh_task.await {
        warn!("Refresh task ended abnormally: {}", e);
    }
    if let Err(e) = signal_task.await {
        warn!("Signal task ended abnormally: {}", e);
    }

    info!("CTicker stopped");
    result
}

fn restore_terminal(mut surface: TerminalSurface) -> Result<()> {
    surface
        .restore()
        .map_err(|e| anyhow::anyhow!("Failed to restore terminal state: {}", e))
}
