//! Interactive terminal session

use crate::app::{App, AppAction};
use crate::ui;
use casedash_client::DashboardSession;
use casedash_core::{Config, Error, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::info;

type Backend = CrosstermBackend<Stdout>;

/// Mount the dashboard and run the terminal view until the user quits
///
/// Requires the multi-threaded Tokio runtime: the view blocks its thread
/// while loads and push events are handled on the others.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn, or the
/// configuration is unusable. Load failures never end the view.
pub async fn run(config: &Config) -> Result<()> {
    let session = DashboardSession::mount(config)?;
    let mut app = App::new(session.store().clone(), config.ui.title.clone());
    let tick_rate = config.ui.tick_rate();

    let result = tokio::task::block_in_place(|| run_terminal(&mut app, &session, tick_rate));

    session.unmount().await;
    result
}

fn run_terminal(app: &mut App, session: &DashboardSession, tick_rate: Duration) -> Result<()> {
    enable_raw_mode().map_err(|e| Error::Terminal(format!("failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(Error::Terminal(format!(
            "failed to enter alternate screen: {e}"
        )));
    }

    let result = Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| Error::Terminal(format!("failed to create terminal: {e}")))
        .and_then(|mut terminal| {
            let outcome = event_loop(&mut terminal, app, session, tick_rate);
            restore(&mut terminal).and(outcome)
        });

    if result.is_err() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
    result
}

fn event_loop(
    terminal: &mut Terminal<Backend>,
    app: &mut App,
    session: &DashboardSession,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if !event::poll(tick_rate)? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match app.handle_key(key) {
                AppAction::Continue => {}
                AppAction::Reload => {
                    info!("Manual reload requested");
                    session.spawn_reload();
                }
                AppAction::Quit => return Ok(()),
            }
        }
    }
}

fn restore(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
