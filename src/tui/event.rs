//! Keyboard event handling for the TUI.
//!
//! Maps crossterm keyboard events to application state changes.
//! Key behavior depends on which panel has focus.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Focus};

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Ctrl+C`: Quit from anywhere
/// - `q`: Quit when the query input is not focused
/// - `Ctrl+O`: Toggle online mode
/// - `Tab` / `Shift+Tab`: Cycle focus between panels
/// - `Esc`: Return to the query input
/// - When `QueryInput` focused: typing edits the query, Enter runs it
/// - When `ResultList` focused: j/k or arrows move the selection
/// - When `AnswerView` focused: j/k or arrows scroll
///
/// # Examples
///
/// ```
/// use maktaba::tui::{App, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new();
/// let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
/// assert!(handle_key_event(&mut app, key));
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers == KeyModifiers::CONTROL {
        match key.code {
            KeyCode::Char('c') => return true,
            KeyCode::Char('o') => {
                app.toggle_online();
                return false;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Tab => {
            app.next_focus();
            return false;
        }
        KeyCode::BackTab => {
            app.prev_focus();
            return false;
        }
        KeyCode::Esc => {
            app.reset_focus();
            app.clear_selection();
            return false;
        }
        _ => {}
    }

    if app.focus() != Focus::QueryInput
        && key.code == KeyCode::Char('q')
        && key.modifiers.is_empty()
    {
        return true;
    }

    match app.focus() {
        Focus::QueryInput => handle_query_input(app, key),
        Focus::ResultList => handle_result_list(app, key),
        Focus::AnswerView => handle_answer_view(app, key),
    }

    false
}

fn handle_query_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_query_char(c);
        }
        KeyCode::Backspace => app.pop_query_char(),
        KeyCode::Enter => app.submit_query(),
        _ => {}
    }
}

fn handle_result_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        _ => {}
    }
}

fn handle_answer_view(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_answer_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_answer_up(1),
        KeyCode::PageDown => app.scroll_answer_down(10),
        KeyCode::PageUp => app.scroll_answer_up(10),
        _ => {}
    }
}
