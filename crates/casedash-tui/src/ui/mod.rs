//! Dashboard rendering

mod cards;
mod filters;
mod table;

use crate::app::{App, Focus};
use casedash_core::DashboardView;
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

/// Draw the whole dashboard
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let store = app.store().clone();
    store.read(|view| draw_view(frame, app, view));
}

fn draw_view(frame: &mut Frame<'_>, app: &mut App, view: &DashboardView) {
    let [header, cards_area, filters_area, summary_area, table_area, help_area] =
        Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    let title = Paragraph::new(Line::from(Span::styled(
        app.title().to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(title, header);

    cards::draw_cards(frame, view.counts(), cards_area);
    filters::draw_filters(frame, app, view, filters_area);

    if let Some(summary) = view.summary() {
        frame.render_widget(
            Paragraph::new(summary).style(Style::default().fg(Color::Yellow)),
            summary_area,
        );
    }

    table::draw_table(frame, view.filtered(), app.table_state(), table_area);
    draw_help(frame, app.focus(), help_area);
}

fn draw_help(frame: &mut Frame<'_>, focus: Focus, area: ratatui::layout::Rect) {
    let keys: &[(&str, &str)] = match focus {
        Focus::Search => &[("Enter", "search"), ("Esc", "done")],
        Focus::Table => &[
            ("/", "edit search"),
            ("Enter", "search"),
            ("g/G", "hospital group"),
            ("t/T", "TPA"),
            ("r", "reset"),
            ("R", "reload"),
            ("q", "quit"),
        ],
    };

    let spans: Vec<Span<'_>> = keys
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(" {label}  ")),
            ]
        })
        .collect();

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}
