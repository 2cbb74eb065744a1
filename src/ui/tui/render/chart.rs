use chrono::{DateTime, Local};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::market_data::{Candle, Period};
use crate::ui::ChartView;
use crate::ui::format::{display_price, format_axis_price, format_change, format_number};
use crate::ui::tui::viewport::ChartViewport;

const AXIS_WIDTH: u16 = 12;
const AXIS_GAP: u16 = 2;
const INFO_GAP: u16 = 2;
const INFO_PREFERRED_WIDTH: u16 = 37;
const INFO_MIN_WIDTH: u16 = 23;
const INFO_HEIGHT: u16 = 14;
const PRICE_BOX_HEIGHT: u16 = 4;
const GRID_DIVISIONS: u16 = 4;
const AXIS_TICKS: u16 = 5;

/// Width reserved for the candle detail panel; zero when it does not fit
fn info_panel_width(available: u16) -> u16 {
    let mut width = INFO_PREFERRED_WIDTH
        .min(available * 2 / 3)
        .max(INFO_MIN_WIDTH)
        .min(available.saturating_sub(INFO_GAP + 1));
    if width < INFO_MIN_WIDTH {
        width = if available > INFO_MIN_WIDTH {
            INFO_MIN_WIDTH
        } else {
            available / 2
        };
    }
    if width < 10 { 0 } else { width }
}

/// Price range covering every wick, widened when flat
fn price_bounds(candles: &[Candle]) -> (f64, f64) {
    let mut min_price = f64::INFINITY;
    let mut max_price = f64::NEG_INFINITY;
    for candle in candles {
        min_price = min_price.min(candle.low);
        max_price = max_price.max(candle.high);
    }
    if max_price - min_price < 0.000_001 {
        min_price -= 1.0;
        max_price += 1.0;
    }
    (min_price, max_price)
}

pub(super) fn render_chart(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &ChartView<'_>,
    viewport: &mut ChartViewport,
) {
    if view.candles.is_empty() || area.height < 3 {
        *viewport = ChartViewport::default();
        frame.render_widget(
            Paragraph::new("No data available")
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center),
            Rect {
                y: area.y + area.height / 2,
                height: 1,
                ..area
            },
        );
        return;
    }

    // Plot rows leave one line at the bottom for time labels.
    let plot_x = area.x + AXIS_WIDTH + AXIS_GAP;
    let available = area.right().saturating_sub(plot_x + 2).max(1);
    let info_width = info_panel_width(available);
    let info_gap = if info_width == 0 { 0 } else { INFO_GAP };
    let plot = Rect {
        x: plot_x,
        y: area.y,
        width: available.saturating_sub(info_width + info_gap).max(1),
        height: area.height - 1,
    };
    let axis = Rect {
        x: area.x,
        width: AXIS_WIDTH,
        ..plot
    };

    *viewport = ChartViewport::layout(plot.x, plot.width, view.candles.len(), view.cursor);
    let (min_price, max_price) = price_bounds(view.candles);

    draw_grid(frame, plot);
    draw_price_axis(frame, axis, min_price, max_price);
    draw_candlesticks(frame, plot, view.candles, viewport, min_price, max_price);
    if let Some(cursor) = view.cursor {
        draw_cursor(frame, plot, viewport, cursor);
    }
    draw_time_axis(frame, plot.bottom(), plot, view.candles, viewport, view.period);

    if info_width > 0 {
        let info_x = area.right().saturating_sub(info_width);
        let info = Rect {
            x: info_x,
            y: area.y,
            width: info_width,
            height: INFO_HEIGHT.min(area.height),
        };
        if let Some(candle) = view.cursor.and_then(|idx| view.candles.get(idx)) {
            render_info_box(frame, info, candle);
        }

        let price_y = info.bottom() + 1;
        if price_y + PRICE_BOX_HEIGHT <= area.bottom() {
            if let Some(latest) = view.candles.last() {
                let price_box = Rect {
                    y: price_y,
                    height: PRICE_BOX_HEIGHT,
                    ..info
                };
                render_current_price(frame, price_box, latest);
            }
        }
    }
}

fn draw_grid(frame: &mut Frame<'_>, plot: Rect) {
    if plot.width <= 2 || plot.height <= 2 {
        return;
    }
    let style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM);
    let buffer = frame.buffer_mut();
    for step in 0..=GRID_DIVISIONS {
        let y = plot.y + (plot.height - 1) * step / GRID_DIVISIONS;
        for x in (plot.x..plot.right()).step_by(2) {
            buffer.get_mut(x, y).set_style(style).set_symbol("·");
        }
    }
}

fn draw_price_axis(frame: &mut Frame<'_>, axis: Rect, min_price: f64, max_price: f64) {
    let range = max_price - min_price;
    let style = Style::default().fg(Color::Gray);
    let buffer = frame.buffer_mut();
    for tick in 0..AXIS_TICKS {
        let price = max_price - range * f64::from(tick) / f64::from(AXIS_TICKS - 1);
        let y = axis.y + axis.height.saturating_sub(1) * tick / (AXIS_TICKS - 1);
        let mut label = format_axis_price(price, range);
        label.truncate(usize::from(axis.width));
        let label = format!("{:>width$}", label, width = usize::from(axis.width));
        buffer.set_string(axis.x, y, label, style);
    }
}

fn draw_candlesticks(
    frame: &mut Frame<'_>,
    plot: Rect,
    candles: &[Candle],
    viewport: &ChartViewport,
    min_price: f64,
    max_price: f64,
) {
    let price_span = (max_price - min_price).max(f64::EPSILON);
    let buffer = frame.buffer_mut();

    for idx in viewport.start_index..viewport.start_index + viewport.visible {
        let (Some(candle), Some(x)) = (candles.get(idx), viewport.column_of(idx)) else {
            continue;
        };

        let style = if candle.is_bullish() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };

        let mut y_high = price_to_y(candle.high, min_price, price_span, plot);
        let mut y_low = price_to_y(candle.low, min_price, price_span, plot);
        if y_high > y_low {
            std::mem::swap(&mut y_high, &mut y_low);
        }
        for y in y_high..=y_low {
            if within(plot, x, y) {
                buffer.get_mut(x, y).set_style(style).set_symbol("│");
            }
        }

        let mut y_open = price_to_y(candle.open, min_price, price_span, plot);
        let mut y_close = price_to_y(candle.close, min_price, price_span, plot);
        if y_open > y_close {
            std::mem::swap(&mut y_open, &mut y_close);
        }
        if y_open == y_close {
            if within(plot, x, y_open) {
                buffer.get_mut(x, y_open).set_style(style).set_symbol("─");
            }
        } else {
            for y in y_open..=y_close {
                if within(plot, x, y) {
                    buffer.get_mut(x, y).set_style(style).set_symbol("█");
                }
            }
        }
    }
}

/// Dashed column through the selected candle; the candle itself is emphasised
fn draw_cursor(frame: &mut Frame<'_>, plot: Rect, viewport: &ChartViewport, cursor: usize) {
    let Some(x) = viewport.column_of(cursor) else {
        return;
    };
    let buffer = frame.buffer_mut();
    for y in plot.y..plot.bottom() {
        let cell = buffer.get_mut(x, y);
        if matches!(cell.symbol(), "│" | "█" | "─") {
            cell.set_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));
        } else {
            cell.set_style(Style::default().fg(Color::Yellow))
                .set_symbol("┆");
        }
    }
}

fn draw_time_axis(
    frame: &mut Frame<'_>,
    y: u16,
    plot: Rect,
    candles: &[Candle],
    viewport: &ChartViewport,
    period: Period,
) {
    if viewport.visible == 0 {
        return;
    }
    let ticks = usize::from(plot.width / 16).clamp(3, 7).min(viewport.visible);
    let style = Style::default().fg(Color::Gray);
    let buffer = frame.buffer_mut();

    let mut next_free_x = plot.x;
    for tick in 0..ticks {
        let offset = if ticks > 1 {
            (viewport.visible - 1) * tick / (ticks - 1)
        } else {
            0
        };
        let idx = viewport.start_index + offset;
        let (Some(candle), Some(x)) = (candles.get(idx), viewport.column_of(idx)) else {
            continue;
        };
        let label = format_time_label(candle.open_time, period);
        let len = label.chars().count() as u16;
        let label_x = x
            .saturating_sub(len / 2)
            .max(next_free_x)
            .min(plot.right().saturating_sub(len));
        if label_x < next_free_x {
            continue;
        }
        buffer.set_string(label_x, y, &label, style);
        next_free_x = label_x + len + 1;
    }
}

fn format_time_label(open_time: u64, period: Period) -> String {
    let Some(datetime) = i64::try_from(open_time)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
    else {
        return "-".to_string();
    };
    let local = datetime.with_timezone(&Local);
    let pattern = match period {
        Period::OneMinute | Period::FifteenMinutes | Period::OneHour => "%H:%M",
        Period::FourHours => "%m-%d %H:%M",
        Period::OneDay => "%m-%d",
        Period::OneWeek | Period::OneMonth => "%y-%m",
    };
    local.format(pattern).to_string()
}

fn format_full_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_info_box(frame: &mut Frame<'_>, area: Rect, candle: &Candle) {
    let change = candle.change_percent().unwrap_or(0.0);
    let change_style = if candle.is_bullish() {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD)
    };
    let bold = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(format!("Open Time : {}", format_full_time(candle.open_time))),
        Line::from(format!("Close Time: {}", format_full_time(candle.close_time))),
        Line::styled(
            format!("Open : {}", display_price(&candle.open_text, candle.open)),
            bold(Color::Cyan),
        ),
        Line::styled(
            format!("High : {}", display_price(&candle.high_text, candle.high)),
            bold(Color::Green),
        ),
        Line::styled(
            format!("Low  : {}", display_price(&candle.low_text, candle.low)),
            bold(Color::Red),
        ),
        Line::styled(
            format!("Close: {}", display_price(&candle.close_text, candle.close)),
            bold(Color::Yellow),
        ),
        Line::from(format!("Vol  : {}", format_number(candle.volume_base))),
        Line::from(format!("Quote Vol: {}", format_number(candle.volume_quote))),
        Line::from(format!("Trades   : {}", candle.trade_count)),
        Line::from(format!("Taker Buy (B): {}", format_number(candle.taker_buy_base))),
        Line::from(format!("Taker Buy (Q): {}", format_number(candle.taker_buy_quote))),
        Line::from(vec![
            Span::raw("Change: "),
            Span::styled(format_change(change), change_style),
        ]),
    ];

    let block = Block::default().title(" Candle ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_current_price(frame: &mut Frame<'_>, area: Rect, latest: &Candle) {
    let lines = vec![
        Line::from("Current Price:"),
        Line::styled(
            display_price(&latest.close_text, latest.close),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn price_to_y(price: f64, min_price: f64, price_span: f64, area: Rect) -> u16 {
    if area.height <= 1 {
        return area.y;
    }
    let normalized = ((price - min_price) / price_span).clamp(0.0, 1.0);
    let offset = ((1.0 - normalized) * (area.height - 1) as f64).round() as u16;
    area.y + offset.min(area.height - 1)
}

fn within(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}
