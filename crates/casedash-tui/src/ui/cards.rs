//! Count cards

use casedash_core::DashboardCounts;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

pub(super) fn draw_cards(frame: &mut Frame<'_>, counts: DashboardCounts, area: Rect) {
    let [parsed, saved, total] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(area);

    draw_card(frame, "Parsed Cases", counts.parsed, Color::Blue, parsed);
    draw_card(frame, "Saved Cases", counts.saved, Color::Green, saved);
    draw_card(frame, "Total Cases", counts.total(), Color::Magenta, total);
}

fn draw_card(frame: &mut Frame<'_>, title: &str, value: u64, color: Color, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let paragraph = Paragraph::new(value.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(block);

    frame.render_widget(paragraph, area);
}
