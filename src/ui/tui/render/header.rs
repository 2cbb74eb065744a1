use chrono::Local;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use crate::market_data::FetchStatus;
use crate::metrics::RefreshStats;

fn title_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Full-width title bar with an optional brand on the left and a clock on the right
pub(super) fn render_title_bar(frame: &mut Frame<'_>, area: Rect, left: Option<&str>, center: &str) {
    if area.width < 2 || area.height == 0 {
        return;
    }
    let style = title_style();
    frame.render_widget(Block::default().style(style), area);

    let buffer = frame.buffer_mut();
    if let Some(left) = left {
        buffer.set_string(area.x + 1, area.y, left, style);
    }

    let center_len = center.chars().count() as u16;
    let center_x = area.x + area.width.saturating_sub(center_len) / 2;
    buffer.set_string(center_x, area.y, center, style);

    let clock = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let clock_len = clock.len() as u16;
    let clock_x = area.right().saturating_sub(clock_len + 1);
    if clock_x > center_x + center_len {
        buffer.set_string(clock_x, area.y, clock, style);
    }
}

/// Fetch status, refresh counters and either a notice or the screen-specific detail
pub(super) fn render_status_line(
    frame: &mut Frame<'_>,
    area: Rect,
    status: FetchStatus,
    stats: &RefreshStats,
    notice: Option<&str>,
    detail: Span<'_>,
) {
    let status_style = match status {
        FetchStatus::Normal => Style::default().fg(Color::Green),
        FetchStatus::Fetching => Style::default().fg(Color::Yellow),
        FetchStatus::NetworkError => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
    };

    let mut spans = vec![
        Span::raw(" STATUS: "),
        Span::styled(status.label(), status_style),
        Span::styled(
            format!(
                " | CYCLES: {} | FAILED: {} | LAST: {} ms | ",
                stats.cycles, stats.failed_fetches, stats.last_cycle_ms
            ),
            Style::default().fg(Color::Gray),
        ),
    ];
    match notice {
        Some(text) => spans.push(Span::styled(
            text.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        None => spans.push(detail),
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
