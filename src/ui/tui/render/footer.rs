use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

pub(super) fn render_footer(frame: &mut Frame<'_>, area: Rect, keys: &str) {
    frame.render_widget(
        Paragraph::new(format!(" {keys}")).style(Style::default().fg(Color::Gray)),
        area,
    );
}
