//! Case table

use casedash_core::CaseRecord;
use casedash_core::utils::{COLUMN_HEADINGS, CaseRow};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Text,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

const WIDTHS: [Constraint; 9] = [
    Constraint::Min(14),
    Constraint::Length(10),
    Constraint::Length(10),
    Constraint::Min(12),
    Constraint::Min(10),
    Constraint::Length(20),
    Constraint::Length(20),
    Constraint::Length(6),
    Constraint::Length(8),
];

pub(super) fn draw_table(
    frame: &mut Frame<'_>,
    cases: &[CaseRecord],
    state: &mut TableState,
    area: Rect,
) {
    let block = Block::default()
        .title(format!("Cases ({})", cases.len()))
        .borders(Borders::ALL);

    if cases.is_empty() {
        let empty = Paragraph::new("No cases to show")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(COLUMN_HEADINGS)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows = cases.iter().map(|case| {
        let row = CaseRow::from(case);
        let status_style = status_style(&row.status_class);
        Row::new([
            Cell::from(row.patient_name),
            Cell::from(row.al_number),
            Cell::from(row.policy_number),
            Cell::from(row.hospital_group),
            Cell::from(row.tpa_name),
            Cell::from(row.parsed_time),
            Cell::from(row.saved_time),
            Cell::from(row.tat),
            Cell::from(Text::from(row.status)).style(status_style),
        ])
    });

    let table = Table::new(rows, WIDTHS)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_stateful_widget(table, area, state);
}

fn status_style(status_class: &str) -> Style {
    match status_class {
        "saved" => Style::default().fg(Color::Green),
        "parsed" => Style::default().fg(Color::Blue),
        "failed" | "error" => Style::default().fg(Color::Red),
        _ => Style::default(),
    }
}
