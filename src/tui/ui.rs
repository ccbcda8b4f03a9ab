//! UI rendering functions for the TUI.
//!
//! Lays out the query input, the result list, the answer panel with the
//! selected result below it, and a status line.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, Focus, Origin, ResultItem};

const TITLE_PREVIEW_CHARS: usize = 40;

/// Draws the whole screen for the current app state.
pub fn draw(frame: &mut Frame, app: &App) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Min(0),    // Content area
            Constraint::Length(1), // Status line
            Constraint::Length(1), // Shortcut bar
        ])
        .split(frame.area());

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main_chunks[1]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(content_chunks[1]);

    render_query_input(frame, app, main_chunks[0]);
    render_result_list(frame, app, content_chunks[0]);
    render_answer(frame, app, right_chunks[0]);
    render_selected_result(frame, app, right_chunks[1]);
    render_status_line(frame, app, main_chunks[2]);
    render_shortcut_bar(frame, app, main_chunks[3]);
}

fn panel(title: impl Into<String>, focused: bool) -> Block<'static> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    Block::default()
        .borders(Borders::ALL)
        .title(title.into())
        .border_style(border_style)
}

fn render_query_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::QueryInput;

    let mut content = app.query_input().to_string();
    if is_focused {
        content.push('█');
    }

    let title = if app.online() {
        "Ask (online)"
    } else {
        "Ask (offline)"
    };
    frame.render_widget(Paragraph::new(content).block(panel(title, is_focused)), area);
}

/// Formats one result row as `[tag] title (source)`.
fn result_line(item: &ResultItem) -> Line<'static> {
    let (tag, color) = match item.origin {
        Origin::Online => ("web", Color::Green),
        Origin::Local => ("local", Color::Yellow),
    };

    let title = if item.title.chars().count() > TITLE_PREVIEW_CHARS {
        let head: String = item.title.chars().take(TITLE_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        item.title.clone()
    };

    Line::from(vec![
        Span::styled(format!("[{tag}] "), Style::default().fg(color)),
        Span::raw(title),
        Span::raw(" "),
        Span::styled(
            format!("({})", item.source),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

fn render_result_list(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::ResultList;

    let items: Vec<ListItem> = app
        .results()
        .iter()
        .map(|item| ListItem::new(result_line(item)))
        .collect();

    let list = List::new(items)
        .block(panel("Results", is_focused))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::REVERSED),
        );

    let mut list_state = ListState::default();
    list_state.select(app.selected_index());

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn answer_title(app: &App) -> String {
    match app.answer().and_then(|a| a.reason()) {
        Some(reason) => format!("Answer (degraded: {reason})"),
        None => "Answer".to_string(),
    }
}

fn render_answer(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::AnswerView;

    let content = match app.answer() {
        Some(answer) if !answer.is_empty() => tui_markdown::from_str(answer.text()),
        Some(_) => Text::from("Nothing relevant was found."),
        None if app.is_searching() => Text::from("Searching..."),
        None => Text::from("No answer yet"),
    };

    let paragraph = Paragraph::new(content)
        .block(panel(answer_title(app), is_focused))
        .wrap(Wrap { trim: false })
        .scroll((app.answer_scroll(), 0));

    frame.render_widget(paragraph, area);
}

fn render_selected_result(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_result() {
        Some(item) => {
            let bold = Style::default().add_modifier(Modifier::BOLD);
            Text::from(vec![
                Line::from(Span::styled(item.title.clone(), bold)),
                Line::from(Span::styled(
                    item.url.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(""),
                Line::from(item.excerpt.clone()),
            ])
        }
        None => Text::from("No result selected"),
    };

    let paragraph = Paragraph::new(content)
        .block(panel("Source", false))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn status_text(app: &App) -> String {
    format!("{} stored | {}", app.stored_count(), app.status())
}

fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let paragraph = Paragraph::new(status_text(app)).style(Style::default().fg(Color::Yellow));
    frame.render_widget(paragraph, area);
}

fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut shortcuts: Vec<(&str, &str)> = vec![
        ("Ctrl+C", "quit"),
        ("Tab", "next panel"),
        ("Esc", "reset"),
        ("Ctrl+O", "online/offline"),
    ];
    match app.focus() {
        Focus::QueryInput => shortcuts.push(("Enter", "ask")),
        Focus::ResultList => shortcuts.extend([("j/k", "navigate"), ("q", "quit")]),
        Focus::AnswerView => shortcuts.extend([("j/k", "scroll"), ("q", "quit")]),
    }

    let mut spans = Vec::new();
    for (i, (key, action)) in shortcuts.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", sep_style));
        }
        spans.push(Span::styled(key, key_style));
        spans.push(Span::raw(format!(": {action}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answerer::{Answer, DegradeReason};
    use crate::service::AskOutcome;
    use ratatui::{Terminal, backend::TestBackend};

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn item(origin: Origin, title: &str) -> ResultItem {
        ResultItem {
            origin,
            title: title.to_string(),
            source: "Wikipedia".to_string(),
            url: "https://en.wikipedia.org/wiki/Nile".to_string(),
            excerpt: "The Nile is a major river.".to_string(),
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn result_line_tags_origin_and_source() {
        let text = line_text(&result_line(&item(Origin::Online, "Nile")));
        assert_eq!(text, "[web] Nile (Wikipedia)");

        let text = line_text(&result_line(&item(Origin::Local, "Nile")));
        assert!(text.starts_with("[local] "));
    }

    #[test]
    fn result_line_truncates_long_titles_on_char_boundary() {
        let title = "نهر".repeat(20);
        let text = line_text(&result_line(&item(Origin::Online, &title)));
        let expected: String = title.chars().take(TITLE_PREVIEW_CHARS).collect();
        assert!(text.contains(&format!("{expected}...")));
    }

    #[test]
    fn answer_title_names_degrade_reason() {
        let mut app = App::new();
        assert_eq!(answer_title(&app), "Answer");

        app.apply_outcome(AskOutcome {
            query: "nile".to_string(),
            online: Vec::new(),
            cached: Vec::new(),
            answer: Some(Answer::degraded(DegradeReason::UpstreamFailure, "ctx", 800)),
            merged: None,
            errors: Vec::new(),
        });
        assert_eq!(answer_title(&app), "Answer (degraded: upstream_failure)");
    }

    #[test]
    fn status_text_includes_stored_count() {
        let mut app = App::new();
        app.set_stored_count(7);
        assert!(status_text(&app).starts_with("7 stored | "));
    }

    #[test]
    fn draw_renders_panels_and_placeholder() {
        let screen = rendered(&App::new());
        assert!(screen.contains("Ask (online)"));
        assert!(screen.contains("Results"));
        assert!(screen.contains("No answer yet"));
        assert!(screen.contains("0 stored"));
    }

    #[test]
    fn draw_renders_markdown_answer() {
        let mut app = App::new();
        app.apply_outcome(AskOutcome {
            query: "nile".to_string(),
            online: Vec::new(),
            cached: Vec::new(),
            answer: Some(Answer::Full("**Summary:**\n\nThe Nile flows north.".to_string())),
            merged: None,
            errors: Vec::new(),
        });

        let screen = rendered(&app);
        assert!(screen.contains("Summary:"));
        assert!(!screen.contains("**Summary"));
        assert!(screen.contains("The Nile flows north."));
    }
}
