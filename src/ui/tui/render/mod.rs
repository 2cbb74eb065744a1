mod board;
mod chart;
mod footer;
mod header;
mod splash;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

use super::viewport::{BoardViewport, ChartViewport};
use crate::session::SortField;
use crate::ui::{BoardView, ChartView};

use self::board::render_board;
use self::chart::render_chart;
use self::footer::render_footer;
use self::header::{render_status_line, render_title_bar};
pub(super) use self::splash::render_splash;

const BOARD_KEYS: &str = "KEYS: ↑/↓ NAVIGATE | ENTER/CLICK: VIEW CHART";
const CHART_KEYS: &str = "KEYS: ←/→ CURSOR | ↑/↓: CHANGE INTERVAL | F: FOLLOW LATEST | R: REFRESH | LEFT CLICK: PICK CANDLE | RIGHT CLICK/ESC/Q: BACK";

/// Smallest terminal the board and chart layouts fit in
const MIN_WIDTH: u16 = 40;
const MIN_HEIGHT: u16 = 8;

fn fits(area: Rect) -> bool {
    area.width >= MIN_WIDTH && area.height >= MIN_HEIGHT
}

fn render_too_small(frame: &mut Frame<'_>, area: Rect) {
    if area.height == 0 {
        return;
    }
    frame.render_widget(
        Paragraph::new("Terminal too small")
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center),
        Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        },
    );
}

/// Title bar, status line, body and footer
fn split_screen(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

pub(super) fn render_board_screen(
    frame: &mut Frame<'_>,
    view: &BoardView<'_>,
    viewport: &mut BoardViewport,
) {
    let area = frame.size();
    if !fits(area) {
        *viewport = BoardViewport::default();
        render_too_small(frame, area);
        return;
    }
    let [title, status, body, footer] = split_screen(area);

    render_title_bar(frame, title, Some("CTICKER"), "[P][R][I][C][E] [B][O][A][R][D]");

    let sort_label = match view.sort.field {
        SortField::None => "SORT: WATCHLIST".to_string(),
        SortField::Price => format!("SORT: PRICE {}", direction_arrow(view)),
        SortField::Change => format!("SORT: CHANGE {}", direction_arrow(view)),
    };
    render_status_line(
        frame,
        status,
        view.status,
        &view.stats,
        view.notice,
        Span::raw(sort_label),
    );

    render_board(frame, body, view, viewport);

    let keys = format!(
        "{} | F5: SORT BY PRICE {} | F6: SORT BY CHANGE {} | Q: QUIT",
        BOARD_KEYS,
        view.sort.next_hint(SortField::Price),
        view.sort.next_hint(SortField::Change),
    );
    render_footer(frame, footer, &keys);
}

fn direction_arrow(view: &BoardView<'_>) -> &'static str {
    match view.sort.direction {
        crate::session::SortDirection::Descending => "↓",
        crate::session::SortDirection::Ascending => "↑",
    }
}

pub(super) fn render_chart_screen(
    frame: &mut Frame<'_>,
    view: &ChartView<'_>,
    viewport: &mut ChartViewport,
) {
    let area = frame.size();
    if !fits(area) {
        *viewport = ChartViewport::default();
        render_too_small(frame, area);
        return;
    }
    let [title, status, body, footer] = split_screen(area);

    let heading = format!("{} - {} CANDLESTICK CHART", view.symbol, view.period.label());
    render_title_bar(frame, title, None, &heading);

    let follow = if view.follow_latest {
        "FOLLOW: ON"
    } else {
        "FOLLOW: OFF"
    };
    render_status_line(
        frame,
        status,
        view.status,
        &view.stats,
        view.notice,
        Span::raw(follow),
    );

    render_chart(frame, body, view, viewport);
    render_footer(frame, footer, CHART_KEYS);
}
