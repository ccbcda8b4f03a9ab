//! Terminal User Interface for asking questions interactively.
//!
//! Provides a query bar, a result list and a markdown answer panel
//! using ratatui for rendering and crossterm for terminal management.

use std::io;
use std::panic;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::warn;

use crate::service::KnowledgeService;

mod app;
pub mod event;
mod ui;

pub use app::{App, Focus, Origin, ResultItem};

/// Enables raw mode and enters the alternate screen.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// Must run before exiting the TUI, error paths included.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Best-effort restoration usable from a panic hook.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal first.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs a queued question, if any, and stores the outcome in `app`.
///
/// Failures are shown in the status line rather than ending the session.
/// Returns true if a question was run.
fn run_pending_search(app: &mut App, service: &KnowledgeService) -> bool {
    let Some(query) = app.take_pending_query() else {
        return false;
    };

    match service.ask(&query, app.ask_options()) {
        Ok(outcome) => app.apply_outcome(outcome),
        Err(e) => {
            warn!(error = %e, "Question failed");
            app.set_error(format!("{e:#}"));
        }
    }
    refresh_stored_count(app, service);
    true
}

fn refresh_stored_count(app: &mut App, service: &KnowledgeService) {
    match service.count() {
        Ok(count) => app.set_stored_count(count),
        Err(e) => warn!(error = %e, "Failed to count stored records"),
    }
}

/// Runs the main event loop for the TUI.
///
/// Polls for keyboard events, runs queued questions and re-renders.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is always restored, even on error.
pub fn run_event_loop(app: &mut App, service: &KnowledgeService) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, service, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal(
    app: &mut App,
    service: &KnowledgeService,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            ui::draw(frame, app);
        })?;

        // The frame above shows the "Searching" status before the blocking call
        if run_pending_search(app, service) {
            continue;
        }

        if crossterm_event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
            && event::handle_key_event(app, key)
        {
            break;
        }
    }

    Ok(())
}

/// Entry point for the TUI application.
///
/// # Errors
///
/// Returns an error if the terminal cannot be initialized or the event loop
/// fails.
pub fn run(service: &KnowledgeService) -> Result<()> {
    init_panic_hook();

    let mut app = App::new();
    refresh_stored_count(&mut app, service);

    run_event_loop(&mut app, service).context("TUI event loop failed")?;

    Ok(())
}
