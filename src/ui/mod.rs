//! User Interface module
//!
//! The render/input loop ([`ui_manager`]) drives a [`DrawSurface`]; the
//! ratatui implementation lives in [`tui`].

pub mod format;
pub mod tui;
pub mod ui_manager;

use std::time::{Duration, Instant};

use crate::AppResult;
use crate::market_data::{Candle, FetchStatus, Period, SymbolName, TickerRow};
use crate::metrics::RefreshStats;
use crate::session::{ChartSession, PriceBoard, SortField, SortState};

pub use ui_manager::{UIManager, initial_fetch_or_quit};

/// How long a footer notice stays visible
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Which screen the render/input loop is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    #[default]
    Board,
    Chart,
}

/// Intent decoded from a key or mouse event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    None,
    MoveSelection(isize),
    OpenSelected,
    /// Open the chart for a board row, by display position
    OpenRow(usize),
    CycleSort(SortField),
    Quit,
    ChangePeriod(isize),
    MoveCursor(isize),
    SelectCandle(usize),
    ToggleFollow,
    ForceRefresh,
    CloseChart,
}

/// Price movement since the previous frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceMove {
    #[default]
    Flat,
    Up,
    Down,
}

/// Everything the board renderer needs for one frame
#[derive(Debug)]
pub struct BoardView<'a> {
    pub rows: &'a [TickerRow],
    pub moves: &'a [PriceMove],
    pub selected: usize,
    pub sort: SortState,
    pub status: FetchStatus,
    pub stats: RefreshStats,
    pub notice: Option<&'a str>,
}

/// Everything the chart renderer needs for one frame
#[derive(Debug)]
pub struct ChartView<'a> {
    pub symbol: SymbolName,
    pub period: Period,
    pub candles: &'a [Candle],
    pub cursor: Option<usize>,
    pub follow_latest: bool,
    pub status: FetchStatus,
    pub stats: RefreshStats,
    pub notice: Option<&'a str>,
}

/// Terminal abstraction the render/input loop draws into.
///
/// Hit tests answer against the geometry of the most recent draw.
pub trait DrawSurface {
    fn draw_board(&mut self, view: &BoardView<'_>) -> AppResult<()>;

    fn draw_chart(&mut self, view: &ChartView<'_>) -> AppResult<()>;

    /// Board row (display position) under terminal row `y`
    fn hit_test_row(&self, y: u16) -> Option<usize>;

    /// Candle index under terminal column `x`
    fn hit_test_candle(&self, x: u16) -> Option<usize>;

    /// Audible error cue
    fn bell(&mut self);
}

#[derive(Debug, Clone)]
struct Notice {
    text: String,
    expires_at: Instant,
}

/// State owned by the render/input loop
#[derive(Debug, Default)]
pub struct AppState {
    pub mode: AppMode,
    pub selected: usize,
    pub sort: SortState,
    pub board: PriceBoard,
    pub chart: ChartSession,
    notice: Option<Notice>,
    /// Price drawn last frame, by watchlist position
    last_prices: Vec<f64>,
    moves: Vec<PriceMove>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the board selection by `delta`, clamped to the row range
    pub fn move_selection(&mut self, delta: isize) {
        let target = self.selected.saturating_add_signed(delta);
        self.selected = self.board.clamp_selection(target);
    }

    /// Show a transient footer message
    pub fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            expires_at: Instant::now() + NOTICE_DURATION,
        });
    }

    /// Current notice, dropping it once expired
    pub fn notice(&mut self, now: Instant) -> Option<&str> {
        if self.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.notice = None;
        }
        self.notice.as_ref().map(|n| n.text.as_str())
    }

    /// Compare the snapshot against last frame's prices and remember the new ones
    pub fn track_price_moves(&mut self) {
        let rows = self.board.rows();
        let origins = self.board.origins();
        if self.last_prices.len() != rows.len() {
            self.last_prices = vec![f64::NAN; rows.len()];
        }

        self.moves.clear();
        for (row, &origin) in rows.iter().zip(origins) {
            let previous = self.last_prices[origin];
            let movement = if previous.is_nan() || (row.price - previous).abs() <= 1e-9 {
                PriceMove::Flat
            } else if row.price > previous {
                PriceMove::Up
            } else {
                PriceMove::Down
            };
            self.moves.push(movement);
            self.last_prices[origin] = row.price;
        }
    }

    pub fn price_moves(&self) -> &[PriceMove] {
        &self.moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::{SymbolName, TickerStore};
    use crate::session::SortDirection;

    fn store(prices: &[f64]) -> TickerStore {
        let rows = prices
            .iter()
            .enumerate()
            .map(|(i, p)| TickerRow {
                symbol: SymbolName::new(&format!("SYM{i}")).unwrap(),
                price: *p,
                timestamp: 1,
                ..TickerRow::default()
            })
            .collect();
        TickerStore::from_rows(rows)
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = AppState::new();
        app.board.refresh_snapshot(&store(&[1.0, 2.0, 3.0]));

        app.move_selection(-1);
        assert_eq!(app.selected, 0);
        app.move_selection(5);
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn test_price_moves_follow_origin_across_sorts() {
        let mut app = AppState::new();
        app.board.refresh_snapshot(&store(&[10.0, 20.0]));
        app.track_price_moves();
        assert_eq!(app.price_moves(), &[PriceMove::Flat, PriceMove::Flat]);

        // Sorted by price descending the second symbol comes first.
        let changed = store(&[11.0, 19.0]);
        app.board.refresh_snapshot(&changed);
        app.board.apply_sort(SortState {
            field: SortField::Price,
            direction: SortDirection::Descending,
        });
        app.track_price_moves();
        assert_eq!(app.price_moves(), &[PriceMove::Down, PriceMove::Up]);
    }

    #[test]
    fn test_notice_expires() {
        let mut app = AppState::new();
        app.set_notice("Failed to load chart");
        let now = Instant::now();
        assert_eq!(app.notice(now), Some("Failed to load chart"));
        assert_eq!(app.notice(now + NOTICE_DURATION), None);
    }
}
