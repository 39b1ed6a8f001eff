use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{surface_error, ApiError, ErrorInterceptor, NoInterception};
use crate::view_model::{SearchBoxView, StatusNode, SuggestionItem};
use crate::SearchEffect;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

pub type TimerId = u64;
pub type SearchId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub debounce: Duration,
    /// Send empty text to the data source ("browse all") instead of
    /// answering it with an empty list.
    pub allow_empty_search: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            allow_empty_search: false,
        }
    }
}

/// The debounce timer and the in-flight search are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    DebouncePending {
        timer: TimerId,
    },
    Searching {
        search: SearchId,
    },
}

/// State of one search field: the live text, the suggestions of the last
/// applied search, and at most one queued query.
#[derive(Clone)]
pub struct SearchBox<I> {
    config: SearchConfig,
    interceptor: Arc<dyn ErrorInterceptor>,
    input_text: String,
    suggestions: Vec<I>,
    pending_query: Option<String>,
    phase: SearchPhase,
    discard_in_flight: bool,
    error_message: Option<String>,
    next_id: u64,
    dirty: bool,
}

impl<I> SearchBox<I> {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            interceptor: Arc::new(NoInterception),
            input_text: String::new(),
            suggestions: Vec::new(),
            pending_query: None,
            phase: SearchPhase::Idle,
            discard_in_flight: false,
            error_message: None,
            next_id: 0,
            dirty: false,
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn ErrorInterceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn suggestions(&self) -> &[I] {
        &self.suggestions
    }

    pub fn pending_query(&self) -> Option<&str> {
        self.pending_query.as_deref()
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.phase, SearchPhase::Searching { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_text(&mut self, text: String) {
        self.input_text = text;
        self.suggestions.clear();
        self.dirty = true;
    }

    /// Records `query` as the latest intent and arms the debounce timer unless
    /// a search is in flight; the query is then drained when it completes.
    pub(crate) fn queue_query(&mut self, query: String, effects: &mut Vec<SearchEffect<I>>) {
        self.pending_query = Some(query);
        match self.phase {
            // The in-flight answer is superseded by the queued query either way.
            SearchPhase::Searching { .. } => self.discard_in_flight = false,
            SearchPhase::DebouncePending { timer } => {
                effects.push(SearchEffect::CancelTimer { timer });
                self.arm_timer(effects);
            }
            SearchPhase::Idle => self.arm_timer(effects),
        }
    }

    pub(crate) fn debounce_elapsed(&mut self, timer: TimerId, effects: &mut Vec<SearchEffect<I>>) {
        if self.phase != (SearchPhase::DebouncePending { timer }) {
            return;
        }
        self.phase = SearchPhase::Idle;
        if let Some(query) = self.pending_query.take() {
            self.start_search(query, effects);
        }
    }

    pub(crate) fn search_finished(
        &mut self,
        search: SearchId,
        result: Result<Vec<I>, ApiError>,
        effects: &mut Vec<SearchEffect<I>>,
    ) {
        if self.phase != (SearchPhase::Searching { search }) {
            return;
        }
        self.phase = SearchPhase::Idle;
        self.dirty = true;
        // The global hook sees every error, even one that is never displayed.
        let result = result.map_err(|error| surface_error(self.interceptor.as_ref(), &error));

        // A newer query supersedes this result; run it without another debounce.
        if let Some(query) = self.pending_query.take() {
            self.start_search(query, effects);
            return;
        }
        if std::mem::take(&mut self.discard_in_flight) {
            return;
        }
        match result {
            Ok(items) => self.suggestions = items,
            Err(message) => {
                self.suggestions.clear();
                self.error_message = message;
            }
        }
    }

    /// Leaves free-text mode: drops queued intent and any result still on its
    /// way back.
    pub(crate) fn settle(&mut self, text: String, effects: &mut Vec<SearchEffect<I>>) {
        self.input_text = text;
        self.suggestions.clear();
        self.pending_query = None;
        self.error_message = None;
        match self.phase {
            SearchPhase::DebouncePending { timer } => {
                effects.push(SearchEffect::CancelTimer { timer });
                self.phase = SearchPhase::Idle;
            }
            SearchPhase::Searching { .. } => self.discard_in_flight = true,
            SearchPhase::Idle => {}
        }
        self.dirty = true;
    }

    fn start_search(&mut self, query: String, effects: &mut Vec<SearchEffect<I>>) {
        self.error_message = None;
        self.discard_in_flight = false;
        self.dirty = true;
        if query.is_empty() && !self.config.allow_empty_search {
            self.suggestions.clear();
            return;
        }
        let search = self.allocate_id();
        self.phase = SearchPhase::Searching { search };
        effects.push(SearchEffect::RunSearch { search, query });
    }

    fn arm_timer(&mut self, effects: &mut Vec<SearchEffect<I>>) {
        let timer = self.allocate_id();
        self.phase = SearchPhase::DebouncePending { timer };
        effects.push(SearchEffect::ArmTimer {
            timer,
            delay: self.config.debounce,
        });
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl<I: SuggestionItem> SearchBox<I> {
    pub fn find_suggestion(&self, key: &str) -> Option<&I> {
        self.suggestions
            .iter()
            .find(|item| item.suggestion().key == key)
    }

    pub fn view(&self) -> SearchBoxView {
        // A search abandoned by a selection is still tracked, but not shown.
        let phase = if self.discard_in_flight {
            SearchPhase::Idle
        } else {
            self.phase
        };
        let status = match phase {
            SearchPhase::Searching { .. } => Some(StatusNode::Loading),
            _ => self
                .error_message
                .as_ref()
                .map(|message| StatusNode::Error {
                    message: message.clone(),
                }),
        };
        SearchBoxView {
            text: self.input_text.clone(),
            phase,
            suggestions: self
                .suggestions
                .iter()
                .map(SuggestionItem::suggestion)
                .collect(),
            status,
        }
    }
}

impl<I: fmt::Debug> fmt::Debug for SearchBox<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchBox")
            .field("config", &self.config)
            .field("input_text", &self.input_text)
            .field("suggestions", &self.suggestions)
            .field("pending_query", &self.pending_query)
            .field("phase", &self.phase)
            .field("error_message", &self.error_message)
            .finish_non_exhaustive()
    }
}
