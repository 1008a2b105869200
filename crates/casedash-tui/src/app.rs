//! Interactive dashboard state and key handling

use casedash_client::DashboardStore;
use casedash_core::DashboardView;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

/// Which control receives key presses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    /// Table navigation and filter shortcuts
    #[default]
    Table,
    /// Free-text search box
    Search,
}

/// What the event loop should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Keep running
    Continue,
    /// Fetch a fresh snapshot
    Reload,
    /// Leave the dashboard
    Quit,
}

/// Interactive dashboard
#[derive(Debug)]
pub struct App {
    store: DashboardStore,
    title: String,
    search: Input,
    focus: Focus,
    table: TableState,
}

impl App {
    /// Create the view over `store`
    #[must_use]
    pub fn new(store: DashboardStore, title: impl Into<String>) -> Self {
        Self {
            store,
            title: title.into(),
            search: Input::default(),
            focus: Focus::Table,
            table: TableState::default(),
        }
    }

    /// Shared dashboard state
    #[must_use]
    pub const fn store(&self) -> &DashboardStore {
        &self.store
    }

    /// Header title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Search box contents
    #[must_use]
    pub const fn search(&self) -> &Input {
        &self.search
    }

    /// Focused control
    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    /// Table scroll and selection state
    pub const fn table_state(&mut self) -> &mut TableState {
        &mut self.table
    }

    /// Handle one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Table => self.handle_table_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Enter => {
                self.focus = Focus::Table;
                self.search_now();
            }
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Table,
            _ => {
                if self.search.handle_event(&Event::Key(key)).is_some() {
                    let text = self.search.value().to_string();
                    self.store.update(|view| view.set_search_text(text));
                }
            }
        }
        AppAction::Continue
    }

    fn handle_table_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Char('R') => return AppAction::Reload,
            KeyCode::Char('/') | KeyCode::Tab => self.focus = Focus::Search,
            KeyCode::Enter | KeyCode::Char('s') => self.search_now(),
            KeyCode::Char('r') | KeyCode::Esc => self.reset(),
            KeyCode::Char('g') => self.cycle_group(true),
            KeyCode::Char('G') => self.cycle_group(false),
            KeyCode::Char('t') => self.cycle_tpa(true),
            KeyCode::Char('T') => self.cycle_tpa(false),
            KeyCode::Down | KeyCode::Char('j') => self.table.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.table.select_previous(),
            KeyCode::Home => self.table.select_first(),
            KeyCode::End => self.table.select_last(),
            _ => {}
        }
        AppAction::Continue
    }

    fn search_now(&mut self) {
        self.store.update(DashboardView::apply_filters);
        self.table.select(None);
        *self.table.offset_mut() = 0;
    }

    fn reset(&mut self) {
        self.search.reset();
        self.store.update(DashboardView::reset_filters);
        self.table.select(None);
        *self.table.offset_mut() = 0;
    }

    fn cycle_group(&mut self, forward: bool) {
        self.store.update(|view| {
            let next = cycle(view.hospital_groups(), view.criteria().hospital_group(), forward);
            view.select_hospital_group(next);
        });
    }

    fn cycle_tpa(&mut self, forward: bool) {
        self.store.update(|view| {
            let next = cycle(view.tpa_options(), view.criteria().tpa(), forward);
            view.select_tpa(next);
        });
    }
}

/// Step through `options` with "all" (`None`) before the first entry
fn cycle(options: &[String], current: Option<&str>, forward: bool) -> Option<String> {
    let position = current.and_then(|c| options.iter().position(|o| o == c));
    let next = match (position, forward) {
        (None, true) => options.first(),
        (None, false) => options.last(),
        (Some(i), true) => options.get(i + 1),
        (Some(i), false) => i.checked_sub(1).and_then(|p| options.get(p)),
    };
    next.cloned()
}
