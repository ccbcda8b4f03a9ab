use crate::answerer::Answer;
use crate::service::{AskOptions, AskOutcome};
use crate::text::truncate_chars;

const EXCERPT_CHARS: usize = 200;

/// Where a listed result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Fetched from a remote source during this question.
    Online,
    /// Already in the local store.
    Local,
}

/// One row of the result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub origin: Origin,
    pub title: String,
    pub source: String,
    pub url: String,
    pub excerpt: String,
}

/// Application state for the TUI.
///
/// Holds the query being typed, the last answer, the listed results and
/// panel focus. Searches are queued with [`App::submit_query`] and run by
/// the event loop between frames.
#[derive(Debug, Clone)]
pub struct App {
    query_input: String,
    focus: Focus,
    /// Query waiting to be run by the event loop
    pending_query: Option<String>,
    online: bool,
    answer: Option<Answer>,
    results: Vec<ResultItem>,
    selected_index: Option<usize>,
    answer_scroll: u16,
    stored_count: usize,
    status: String,
}

/// Panel focus state for keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Query input bar (typing edits the query, Enter runs it)
    QueryInput,
    /// Result list (j/k navigation)
    ResultList,
    /// Answer panel (j/k scrolling)
    AnswerView,
}

impl App {
    /// Creates an App with an empty query, online mode on and input focus.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::tui::{App, Focus};
    ///
    /// let app = App::new();
    /// assert!(app.results().is_empty());
    /// assert_eq!(app.focus(), Focus::QueryInput);
    /// assert!(app.online());
    /// ```
    pub fn new() -> Self {
        Self {
            query_input: String::new(),
            focus: Focus::QueryInput,
            pending_query: None,
            online: true,
            answer: None,
            results: Vec::new(),
            selected_index: None,
            answer_scroll: 0,
            stored_count: 0,
            status: "Type a question and press Enter".to_string(),
        }
    }

    pub fn query_input(&self) -> &str {
        &self.query_input
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.answer.as_ref()
    }

    pub fn results(&self) -> &[ResultItem] {
        &self.results
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Returns the currently selected result, if any.
    pub fn selected_result(&self) -> Option<&ResultItem> {
        self.selected_index.and_then(|i| self.results.get(i))
    }

    pub fn answer_scroll(&self) -> u16 {
        self.answer_scroll
    }

    pub fn stored_count(&self) -> usize {
        self.stored_count
    }

    pub fn set_stored_count(&mut self, count: usize) {
        self.stored_count = count;
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns true if remote sources are queried.
    pub fn online(&self) -> bool {
        self.online
    }

    /// Flips between online and offline questions.
    pub fn toggle_online(&mut self) {
        self.online = !self.online;
        self.status = if self.online {
            "Online mode".to_string()
        } else {
            "Offline mode: local store only".to_string()
        };
    }

    /// Options for the next question.
    pub fn ask_options(&self) -> AskOptions {
        AskOptions {
            online: self.online,
            summarize: true,
        }
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query_input.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.query_input.pop();
    }

    /// Queues the typed query for the event loop.
    ///
    /// Blank input and a search already in flight are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use maktaba::tui::App;
    ///
    /// let mut app = App::new();
    /// app.submit_query();
    /// assert!(!app.is_searching());
    ///
    /// for c in "nile".chars() {
    ///     app.push_query_char(c);
    /// }
    /// app.submit_query();
    /// assert!(app.is_searching());
    /// assert_eq!(app.take_pending_query().as_deref(), Some("nile"));
    /// ```
    pub fn submit_query(&mut self) {
        let query = self.query_input.trim();
        if query.is_empty() || self.pending_query.is_some() {
            return;
        }
        self.status = format!("Searching for \"{query}\"...");
        self.pending_query = Some(query.to_string());
    }

    /// Returns true while a submitted query has not been run yet.
    pub fn is_searching(&self) -> bool {
        self.pending_query.is_some()
    }

    /// Takes the queued query, leaving none pending.
    pub fn take_pending_query(&mut self) -> Option<String> {
        self.pending_query.take()
    }

    /// Replaces the answer and result list with a finished question.
    pub fn apply_outcome(&mut self, outcome: AskOutcome) {
        let mut results: Vec<ResultItem> = outcome
            .online
            .iter()
            .map(|r| ResultItem {
                origin: Origin::Online,
                title: r.title.clone(),
                source: r.source.clone(),
                url: r.url.clone(),
                excerpt: truncate_chars(&r.content, EXCERPT_CHARS).to_string(),
            })
            .collect();
        results.extend(outcome.cached.iter().map(|scored| ResultItem {
            origin: Origin::Local,
            title: scored.record.query.clone(),
            source: scored.record.source.clone(),
            url: scored.record.url.clone(),
            excerpt: truncate_chars(&scored.record.summary, EXCERPT_CHARS).to_string(),
        }));

        self.status = match (results.len(), outcome.errors.len()) {
            (0, _) => format!("No results for \"{}\"", outcome.query),
            (n, 0) => format!("{n} results for \"{}\"", outcome.query),
            (n, e) => format!("{n} results for \"{}\" ({e} errors)", outcome.query),
        };
        self.results = results;
        self.answer = outcome.answer;
        self.selected_index = None;
        self.answer_scroll = 0;
    }

    /// Shows a failed question in the status bar.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = format!("Error: {}", message.into());
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::QueryInput => Focus::ResultList,
            Focus::ResultList => Focus::AnswerView,
            Focus::AnswerView => Focus::QueryInput,
        };
        self.auto_select_on_result_focus();
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            Focus::QueryInput => Focus::AnswerView,
            Focus::ResultList => Focus::QueryInput,
            Focus::AnswerView => Focus::ResultList,
        };
        self.auto_select_on_result_focus();
    }

    fn auto_select_on_result_focus(&mut self) {
        if self.focus == Focus::ResultList
            && self.selected_index.is_none()
            && !self.results.is_empty()
        {
            self.selected_index = Some(0);
        }
    }

    /// Moves selection down, wrapping to the top.
    pub fn select_next(&mut self) {
        if self.results.is_empty() {
            self.selected_index = None;
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) if i + 1 < self.results.len() => i + 1,
            _ => 0,
        });
    }

    /// Moves selection up, wrapping to the bottom.
    pub fn select_previous(&mut self) {
        if self.results.is_empty() {
            self.selected_index = None;
            return;
        }
        self.selected_index = Some(match self.selected_index {
            None | Some(0) => self.results.len() - 1,
            Some(i) => i - 1,
        });
    }

    pub fn scroll_answer_down(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_add(amount);
    }

    pub fn scroll_answer_up(&mut self, amount: u16) {
        self.answer_scroll = self.answer_scroll.saturating_sub(amount);
    }

    pub fn clear_selection(&mut self) {
        self.selected_index = None;
    }

    pub fn reset_focus(&mut self) {
        self.focus = Focus::QueryInput;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
