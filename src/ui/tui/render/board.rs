use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Cell, Row, Table};

use crate::market_data::TickerRow;
use crate::ui::format::{
    display_price, format_change, format_integer_with_commas, format_number_with_commas,
};
use crate::ui::tui::viewport::BoardViewport;
use crate::ui::{BoardView, PriceMove};

/// Board column anchored at a fixed offset; shown once the terminal is wider than `min_width`
struct Column {
    title: &'static str,
    x: u16,
    min_width: u16,
}

const COLUMNS: [Column; 8] = [
    Column { title: "SYMBOL", x: 2, min_width: 0 },
    Column { title: "PRICE", x: 18, min_width: 0 },
    Column { title: "CHANGE 24H", x: 35, min_width: 0 },
    Column { title: "HIGH", x: 52, min_width: 62 },
    Column { title: "LOW", x: 70, min_width: 80 },
    Column { title: "VOLUME", x: 88, min_width: 100 },
    Column { title: "TRADES", x: 108, min_width: 114 },
    Column { title: "QUOTE VOL", x: 126, min_width: 138 },
];

/// Rows above the first data row: column titles and a separator
const TABLE_HEADER_ROWS: u16 = 2;

fn visible_columns(width: u16) -> usize {
    COLUMNS.iter().take_while(|c| width > c.min_width).count()
}

fn column_widths(shown: usize, total_width: u16) -> Vec<Constraint> {
    (0..shown)
        .map(|i| match COLUMNS.get(i + 1) {
            Some(next) if i + 1 < shown => Constraint::Length(next.x - COLUMNS[i].x),
            _ => Constraint::Length(total_width.saturating_sub(COLUMNS[i].x)),
        })
        .collect()
}

pub(super) fn render_board(
    frame: &mut Frame<'_>,
    area: Rect,
    view: &BoardView<'_>,
    viewport: &mut BoardViewport,
) {
    let data_rows = usize::from(area.height.saturating_sub(TABLE_HEADER_ROWS));
    viewport.start_y = area.y + TABLE_HEADER_ROWS;
    viewport.follow_selection(view.selected, view.rows.len(), data_rows);

    let shown = visible_columns(area.width);
    let table_area = Rect {
        x: area.x + COLUMNS[0].x,
        width: area.width.saturating_sub(COLUMNS[0].x),
        ..area
    };

    let header = Row::new(COLUMNS[..shown].iter().map(|c| c.title))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = viewport
        .visible()
        .map(|idx| {
            let movement = view.moves.get(idx).copied().unwrap_or_default();
            let mut row = Row::new(board_cells(&view.rows[idx], movement, shown));
            if idx == view.selected {
                row = row.style(
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                );
            }
            row
        })
        .collect();

    let table = Table::new(rows, column_widths(shown, area.width))
        .header(header)
        .column_spacing(0);
    frame.render_widget(table, table_area);

    let buffer = frame.buffer_mut();
    let separator_y = area.y + 1;
    if separator_y < area.bottom() {
        buffer.set_string(
            area.x,
            separator_y,
            "─".repeat(usize::from(area.width)),
            Style::default().fg(Color::DarkGray),
        );
    }

    let indicator_x = area.right().saturating_sub(2);
    let indicator_style = Style::default().fg(Color::Yellow);
    if viewport.has_more_above() {
        buffer.set_string(indicator_x, viewport.start_y, "▲", indicator_style);
    }
    if viewport.has_more_below() && viewport.rows > 0 {
        let bottom_y = viewport.start_y + (viewport.rows as u16).saturating_sub(1);
        buffer.set_string(indicator_x, bottom_y, "▼", indicator_style);
    }
}

fn board_cells(row: &TickerRow, movement: PriceMove, shown: usize) -> Vec<Cell<'static>> {
    let mut cells = vec![Cell::from(row.symbol.to_string())];
    if !row.has_data() {
        cells.push(Cell::from("--").style(Style::default().fg(Color::DarkGray)));
        cells.truncate(shown);
        return cells;
    }

    let (arrow, price_style) = match movement {
        PriceMove::Up => ("↑ ", Style::default().fg(Color::Green)),
        PriceMove::Down => ("↓ ", Style::default().fg(Color::Red)),
        PriceMove::Flat => ("  ", Style::default()),
    };
    let change_style = if row.change_24h >= 0.0 {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Red)
    };

    cells.extend([
        Cell::from(format!("{arrow}{}", display_price(&row.price_text, row.price))).style(price_style),
        Cell::from(format_change(row.change_24h)).style(change_style),
        Cell::from(display_price(&row.high_text, row.high_24h)),
        Cell::from(display_price(&row.low_text, row.low_24h)),
        Cell::from(format_number_with_commas(row.volume_base)),
        Cell::from(format_integer_with_commas(row.trade_count)),
        Cell::from(format_number_with_commas(row.volume_quote)),
    ]);
    cells.truncate(shown);
    cells
}
