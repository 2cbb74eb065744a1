//! UI Manager driving the render/input loop

use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::Event;
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::binance::MarketDataClient;
use crate::market_data::{CycleReport, RefreshError, RefreshLoop, StatusCell, TickerStore};
use crate::metrics::RefreshMetrics;
use crate::session::{ChartError, RuntimeContext};

use super::tui::{handle_key_event, map_event};
use super::{AppMode, AppState, BoardView, ChartView, DrawSurface, UiAction};

/// Run the first refresh cycle while the quit keys stay live.
///
/// Raw mode is already on while the splash is shown, so Ctrl-C arrives as a
/// key event rather than a signal. Returns `None` if shutdown was requested
/// before the snapshot completed.
pub async fn initial_fetch_or_quit<E>(
    refresh: &mut RefreshLoop,
    events: &mut E,
    shutdown: &CancellationToken,
) -> Result<Option<CycleReport>, RefreshError>
where
    E: Stream<Item = std::io::Result<Event>> + Unpin,
{
    tokio::select! {
        report = refresh.initial_fetch() => report.map(Some),
        _ = wait_for_quit(events, shutdown) => {
            info!("Shutdown requested before the first snapshot");
            Ok(None)
        }
    }
}

/// Resolve once a quit key is pressed or shutdown is requested elsewhere
async fn wait_for_quit<E>(events: &mut E, shutdown: &CancellationToken)
where
    E: Stream<Item = std::io::Result<Event>> + Unpin,
{
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return,
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if handle_key_event(key, AppMode::Board) == UiAction::Quit {
                        shutdown.cancel();
                        return;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Failed to read terminal input during startup: {}", e);
                    shutdown.cancelled().await;
                    return;
                }
                None => {
                    shutdown.cancelled().await;
                    return;
                }
            },
        }
    }
}

/// UI Manager owning the application state and the draw surface
pub struct UIManager<S: DrawSurface> {
    surface: S,
    app_state: AppState,
    store: Arc<TickerStore>,
    status: Arc<StatusCell>,
    metrics: Arc<RefreshMetrics>,
    client: Arc<dyn MarketDataClient>,
    shutdown: CancellationToken,
    /// Longest wait for input before the next frame
    input_timeout: Duration,
    render_count: u64,
}

impl<S: DrawSurface> UIManager<S> {
    pub fn new(context: &RuntimeContext, surface: S) -> Self {
        Self {
            surface,
            app_state: AppState::new(),
            store: Arc::clone(context.store()),
            status: Arc::clone(context.status()),
            metrics: Arc::clone(context.metrics()),
            client: Arc::clone(context.client()),
            shutdown: context.shutdown_token(),
            input_timeout: context.settings().input_timeout(),
            render_count: 0,
        }
    }

    pub fn app_state(&self) -> &AppState {
        &self.app_state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Render and handle input until shutdown is requested or input ends.
    ///
    /// One frame is drawn per iteration; the loop then waits for the next
    /// terminal event, the input timeout or shutdown, whichever comes first.
    pub async fn run<E>(&mut self, mut events: E) -> Result<()>
    where
        E: Stream<Item = std::io::Result<Event>> + Unpin,
    {
        info!("Starting UI rendering loop");

        while !self.shutdown.is_cancelled() {
            self.render_frame().await?;

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = events.next() => match event {
                    Some(Ok(event)) => {
                        let action = map_event(&event, self.app_state.mode, &self.surface);
                        self.dispatch(action).await;
                    }
                    Some(Err(e)) => {
                        self.shutdown.cancel();
                        return Err(anyhow::anyhow!("Failed to read terminal input: {}", e));
                    }
                    None => {
                        info!("Terminal input closed");
                        self.shutdown.cancel();
                    }
                },
                _ = tokio::time::sleep(self.input_timeout) => {}
            }
        }

        info!("UI rendering loop stopped after {} frames", self.render_count);
        Ok(())
    }

    /// Draw one frame of the current screen
    pub async fn render_frame(&mut self) -> Result<()> {
        let now = Instant::now();
        let status = self.status.get();
        let stats = self.metrics.snapshot();

        match self.app_state.mode {
            AppMode::Board => {
                let app = &mut self.app_state;
                app.board.refresh_snapshot(&self.store);
                app.board.apply_sort(app.sort);
                app.selected = app.board.clamp_selection(app.selected);
                app.track_price_moves();

                let notice = app.notice(now).map(str::to_owned);
                let view = BoardView {
                    rows: app.board.rows(),
                    moves: app.price_moves(),
                    selected: app.selected,
                    sort: app.sort,
                    status,
                    stats,
                    notice: notice.as_deref(),
                };
                self.surface
                    .draw_board(&view)
                    .map_err(|e| anyhow::anyhow!("Failed to render frame: {}", e))?;
            }
            AppMode::Chart => {
                let chart = &mut self.app_state.chart;
                let unix_now = u64::try_from(Utc::now().timestamp()).unwrap_or(0);
                if let Err(e) = chart.refresh_if_expired(self.client.as_ref(), unix_now).await {
                    // Retried on the next frame
                    debug!("Expired candle refresh failed: {}", e);
                }
                chart.apply_live_price(&self.store);
                if chart.follow_latest() {
                    chart.snap_to_latest();
                }

                let notice = self.app_state.notice(now).map(str::to_owned);
                let chart = &self.app_state.chart;
                let Some(symbol) = chart.symbol() else {
                    self.app_state.mode = AppMode::Board;
                    return Ok(());
                };
                let view = ChartView {
                    symbol,
                    period: chart.period(),
                    candles: chart.candles(),
                    cursor: chart.cursor(),
                    follow_latest: chart.follow_latest(),
                    status,
                    stats,
                    notice: notice.as_deref(),
                };
                self.surface
                    .draw_chart(&view)
                    .map_err(|e| anyhow::anyhow!("Failed to render frame: {}", e))?;
            }
        }

        self.render_count += 1;
        Ok(())
    }

    /// Apply a decoded input action
    pub async fn dispatch(&mut self, action: UiAction) {
        let app = &mut self.app_state;
        match action {
            UiAction::None => {}
            UiAction::Quit => {
                info!("Quit requested");
                self.shutdown.cancel();
            }
            UiAction::MoveSelection(delta) => app.move_selection(delta),
            UiAction::CycleSort(field) => {
                app.sort.cycle(field);
                debug!("Sort changed to {:?} {:?}", app.sort.field, app.sort.direction);
            }
            UiAction::OpenRow(display_index) => {
                app.selected = app.board.clamp_selection(display_index);
                self.open_selected().await;
            }
            UiAction::OpenSelected => self.open_selected().await,
            UiAction::ChangePeriod(step) => {
                let result = app.chart.change_period(self.client.as_ref(), step).await;
                if let Err(e) = result {
                    self.error_cue(format!("Interval change failed: {e}"));
                }
            }
            UiAction::MoveCursor(delta) => {
                app.chart.move_cursor(delta);
            }
            UiAction::SelectCandle(index) => {
                app.chart.select(index);
            }
            UiAction::ToggleFollow => app.chart.toggle_follow(),
            UiAction::ForceRefresh => {
                let follow = app.chart.follow_latest();
                let result = app.chart.force_refresh(self.client.as_ref(), follow).await;
                if let Err(e) = result {
                    self.error_cue(format!("Refresh failed: {e}"));
                }
            }
            UiAction::CloseChart => {
                app.chart.close();
                app.mode = AppMode::Board;
            }
        }
    }

    async fn open_selected(&mut self) {
        let app = &mut self.app_state;
        let Some(origin) = app.board.resolve_origin(app.selected) else {
            return;
        };

        match app.chart.open(self.client.as_ref(), &self.store, origin).await {
            Ok(()) => app.mode = AppMode::Chart,
            Err(e) => {
                warn!("Failed to open chart for row {}: {}", origin, e);
                let message = match e {
                    ChartError::NotFound(_) => "Symbol no longer listed".to_string(),
                    other => format!("Chart unavailable: {other}"),
                };
                self.error_cue(message);
            }
        }
    }

    fn error_cue(&mut self, message: String) {
        self.surface.bell();
        self.app_state.set_notice(message);
    }
}
