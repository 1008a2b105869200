//! Filter bar: search box, hospital group and TPA selectors

use crate::app::{App, Focus};
use casedash_core::DashboardView;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

const SEARCH_PLACEHOLDER: &str = "Search Patient / AL / Policy";
const ALL_GROUPS: &str = "All Hospital Groups";
const ALL_TPAS: &str = "All TPAs";

pub(super) fn draw_filters(frame: &mut Frame<'_>, app: &App, view: &DashboardView, area: Rect) {
    let [search_area, group_area, tpa_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ])
    .areas(area);

    draw_search(frame, app, search_area);

    let criteria = view.criteria();
    draw_selector(
        frame,
        "Hospital Group [g]",
        criteria.hospital_group().unwrap_or(ALL_GROUPS),
        group_area,
    );
    draw_selector(
        frame,
        "TPA [t]",
        criteria.tpa().unwrap_or(ALL_TPAS),
        tpa_area,
    );
}

fn draw_search(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let focused = app.focus() == Focus::Search;
    let input = app.search();

    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title("Search [/]")
        .borders(Borders::ALL)
        .border_style(border);

    let width = usize::from(area.width.saturating_sub(2));
    let scroll = input.visual_scroll(width);

    let paragraph = if input.value().is_empty() && !focused {
        Paragraph::new(SEARCH_PLACEHOLDER).style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(input.value()).scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX)))
    };
    frame.render_widget(paragraph.block(block), area);

    if focused {
        let offset = input.visual_cursor().saturating_sub(scroll);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
        frame.set_cursor_position(Position::new(x, area.y.saturating_add(1)));
    }
}

fn draw_selector(frame: &mut Frame<'_>, title: &str, value: &str, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(value.to_string()).block(block), area);
}
