//! Terminal User Interface implementation
//!
//! Provides the ratatui-backed [`DrawSurface`].

mod input;
mod render;
pub mod viewport;

use std::io::{Stdout, Write, stdout};

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use super::{BoardView, ChartView, DrawSurface};
use crate::AppResult;

pub use input::{handle_key_event, map_event};
use render::{render_board_screen, render_chart_screen, render_splash};
use viewport::{BoardViewport, ChartViewport};

/// RAII helper controlling the terminal lifecycle
pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    board: BoardViewport,
    chart: ChartViewport,
}

impl TerminalSurface {
    /// Switch the terminal into raw mode on the alternate screen with mouse reporting
    pub fn new() -> AppResult<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            board: BoardViewport::default(),
            chart: ChartViewport::default(),
        })
    }

    /// Loading screen shown while the first snapshot is fetched
    pub fn draw_splash(&mut self, symbol_count: usize) -> AppResult<()> {
        self.terminal.draw(|frame| render_splash(frame, symbol_count))?;
        Ok(())
    }

    /// Restore terminal to canonical mode
    pub fn restore(&mut self) -> AppResult<()> {
        disable_raw_mode()?;
        let mut stdout = stdout();
        execute!(
            stdout,
            cursor::Show,
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        Ok(())
    }
}

impl DrawSurface for TerminalSurface {
    fn draw_board(&mut self, view: &BoardView<'_>) -> AppResult<()> {
        let viewport = &mut self.board;
        self.terminal
            .draw(|frame| render_board_screen(frame, view, viewport))?;
        Ok(())
    }

    fn draw_chart(&mut self, view: &ChartView<'_>) -> AppResult<()> {
        let viewport = &mut self.chart;
        self.terminal
            .draw(|frame| render_chart_screen(frame, view, viewport))?;
        Ok(())
    }

    fn hit_test_row(&self, y: u16) -> Option<usize> {
        self.board.hit_test_row(y)
    }

    fn hit_test_candle(&self, x: u16) -> Option<usize> {
        self.chart.hit_test_candle(x)
    }

    fn bell(&mut self) {
        let backend = self.terminal.backend_mut();
        if let Err(e) = backend.write_all(b"\x07").and_then(|_| backend.flush()) {
            debug!("Failed to ring terminal bell: {}", e);
        }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        // Attempt to restore the terminal; ignore errors because we are in Drop
        let _ = disable_raw_mode();
        let mut stdout = stdout();
        let _ = execute!(
            stdout,
            cursor::Show,
            LeaveAlternateScreen,
            DisableMouseCapture
        );
    }
}
