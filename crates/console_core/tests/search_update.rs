use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use console_core::{
    is_session_expired, update, ApiError, FailureKind, SearchBox, SearchConfig, SearchEffect,
    SearchMsg, SearchPhase, StatusNode, Suggestion, DEFAULT_DEBOUNCE,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(console_logging::initialize_for_tests);
}

fn item(label: &str, key: &str) -> Suggestion {
    Suggestion {
        label: label.to_string(),
        key: key.to_string(),
    }
}

fn search_box(allow_empty_search: bool) -> SearchBox<Suggestion> {
    SearchBox::new(SearchConfig {
        debounce: DEFAULT_DEBOUNCE,
        allow_empty_search,
    })
}

/// A box whose interceptor claims expired sessions and counts every call.
fn counting_box() -> (SearchBox<Suggestion>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let state = search_box(false).with_interceptor(Arc::new(move |e: &ApiError| {
        counter.fetch_add(1, Ordering::SeqCst);
        is_session_expired(e)
    }));
    (state, calls)
}

fn type_text(
    state: SearchBox<Suggestion>,
    text: &str,
) -> (SearchBox<Suggestion>, Vec<SearchEffect<Suggestion>>) {
    update(state, SearchMsg::TextChanged(text.to_string()))
}

fn armed_timer(effects: &[SearchEffect<Suggestion>]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            SearchEffect::ArmTimer { timer, .. } => Some(*timer),
            _ => None,
        })
        .expect("arm timer effect")
}

fn started_search(effects: &[SearchEffect<Suggestion>]) -> (u64, String) {
    effects
        .iter()
        .find_map(|effect| match effect {
            SearchEffect::RunSearch { search, query } => Some((*search, query.clone())),
            _ => None,
        })
        .expect("run search effect")
}

fn fire(
    state: SearchBox<Suggestion>,
    timer: u64,
) -> (SearchBox<Suggestion>, Vec<SearchEffect<Suggestion>>) {
    update(state, SearchMsg::DebounceElapsed { timer })
}

fn finish(
    state: SearchBox<Suggestion>,
    search: u64,
    result: Result<Vec<Suggestion>, ApiError>,
) -> (SearchBox<Suggestion>, Vec<SearchEffect<Suggestion>>) {
    update(state, SearchMsg::SearchFinished { search, result })
}

#[test]
fn text_change_clears_selection_and_arms_debounce() {
    init_logging();
    let (mut state, effects) = type_text(search_box(false), "foo");

    assert_eq!(
        effects,
        vec![
            SearchEffect::SelectionChanged(None),
            SearchEffect::ArmTimer {
                timer: 1,
                delay: Duration::from_millis(800),
            },
        ]
    );
    assert_eq!(state.phase(), SearchPhase::DebouncePending { timer: 1 });
    assert_eq!(state.pending_query(), Some("foo"));
    assert!(state.consume_dirty());
}

#[test]
fn rapid_typing_rearms_timer_and_searches_last_text_once() {
    init_logging();
    let (state, first) = type_text(search_box(false), "a");
    let first_timer = armed_timer(&first);
    let (state, second) = type_text(state, "ab");
    let (state, third) = type_text(state, "abc");

    assert!(second.contains(&SearchEffect::CancelTimer { timer: first_timer }));
    let last_timer = armed_timer(&third);

    // A timer cancelled earlier firing late is ignored.
    let (state, effects) = fire(state, first_timer);
    assert!(effects.is_empty());

    let (state, effects) = fire(state, last_timer);
    let runs: Vec<_> = effects
        .iter()
        .filter(|effect| matches!(effect, SearchEffect::RunSearch { .. }))
        .collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(started_search(&effects).1, "abc");
    assert!(state.is_searching());
    assert_eq!(state.pending_query(), None);
}

#[test]
fn completed_search_publishes_suggestions() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "foo");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);
    let view = state.view();
    assert_eq!(view.status, Some(StatusNode::Loading));

    let (state, effects) = finish(state, search, Ok(vec![item("Foo Inc", "1")]));

    assert!(effects.is_empty());
    assert!(!state.is_searching());
    assert_eq!(state.suggestions(), &[item("Foo Inc", "1")]);
    assert_eq!(state.view().status, None);
}

#[test]
fn typing_during_search_queues_without_timer_and_drains_immediately() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "ab");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (slow_search, _) = started_search(&effects);

    let (state, effects) = type_text(state, "abc");
    assert_eq!(effects, vec![SearchEffect::SelectionChanged(None)]);
    assert_eq!(state.pending_query(), Some("abc"));

    // The "ab" answer arrives late: it is dropped and "abc" runs right away.
    let (state, effects) = finish(state, slow_search, Ok(vec![item("ab result", "ab")]));
    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, SearchEffect::ArmTimer { .. })));
    let (next_search, query) = started_search(&effects);
    assert_eq!(query, "abc");
    assert!(state.suggestions().is_empty());

    let (state, _) = finish(state, next_search, Ok(vec![item("abc result", "abc")]));
    assert_eq!(state.suggestions(), &[item("abc result", "abc")]);
    assert_eq!(state.phase(), SearchPhase::Idle);
}

#[test]
fn stale_search_ids_are_ignored() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "x");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);

    let (state, effects) = finish(state, search + 100, Ok(vec![item("bogus", "b")]));
    assert!(effects.is_empty());
    assert!(state.is_searching());
    assert!(state.suggestions().is_empty());
}

#[test]
fn empty_text_without_browse_all_never_runs_a_search() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "");
    let (state, effects) = fire(state, armed_timer(&effects));

    assert!(effects.is_empty());
    assert_eq!(state.phase(), SearchPhase::Idle);
    assert!(state.suggestions().is_empty());
}

#[test]
fn empty_text_with_browse_all_runs_a_search() {
    init_logging();
    let (state, effects) = type_text(search_box(true), "");
    let (_state, effects) = fire(state, armed_timer(&effects));

    assert_eq!(started_search(&effects).1, "");
}

#[test]
fn failed_search_shows_formatted_error() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "foo");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);

    let error =
        ApiError::new(FailureKind::HttpStatus(500), "index unavailable").with_code("internal");
    let (state, _) = finish(state, search, Err(error));

    assert_eq!(state.error_message(), Some("index unavailable (internal)"));
    assert_eq!(
        state.view().status,
        Some(StatusNode::Error {
            message: "index unavailable (internal)".to_string()
        })
    );
    assert!(!state.is_searching());
}

#[test]
fn intercepted_search_error_is_not_displayed() {
    init_logging();
    let state = search_box(false).with_interceptor(Arc::new(|e: &ApiError| is_session_expired(e)));
    let (state, effects) = type_text(state, "foo");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);

    let (state, _) = finish(
        state,
        search,
        Err(ApiError::new(FailureKind::HttpStatus(401), "expired")),
    );
    assert_eq!(state.error_message(), None);
    assert_eq!(state.view().status, None);
}

#[test]
fn selecting_a_suggestion_publishes_item_and_sets_label() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "fo");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);
    let (state, _) = finish(
        state,
        search,
        Ok(vec![item("Foo Inc", "1"), item("Fox Ltd", "2")]),
    );

    let (state, effects) = update(
        state,
        SearchMsg::SuggestionSelected {
            key: "2".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![SearchEffect::SelectionChanged(Some(item("Fox Ltd", "2")))]
    );
    assert_eq!(state.input_text(), "Fox Ltd");
    assert!(state.suggestions().is_empty());
}

#[test]
fn selecting_unknown_key_is_ignored() {
    init_logging();
    let (state, _) = type_text(search_box(false), "fo");
    let before = state.view();

    let (state, effects) = update(
        state,
        SearchMsg::SuggestionSelected {
            key: "missing".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view(), before);
}

#[test]
fn clearing_selection_cancels_debounce_and_drops_in_flight_result() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "foo");
    let timer = armed_timer(&effects);
    let (state, effects) = update(state, SearchMsg::SelectionCleared);
    assert_eq!(effects, vec![SearchEffect::CancelTimer { timer }]);
    assert_eq!(state.phase(), SearchPhase::Idle);
    assert_eq!(state.input_text(), "");

    let (state, effects) = type_text(state, "bar");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);
    let (state, _) = update(state, SearchMsg::SelectionCleared);
    assert_eq!(state.view().status, None);

    let (state, effects) = finish(state, search, Ok(vec![item("Bar", "b")]));
    assert!(effects.is_empty());
    assert!(state.suggestions().is_empty());
    assert_eq!(state.phase(), SearchPhase::Idle);
}

#[test]
fn superseded_search_error_still_reaches_interceptor() {
    init_logging();
    let (state, calls) = counting_box();
    let (state, effects) = type_text(state, "ab");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (slow_search, _) = started_search(&effects);
    let (state, _) = type_text(state, "abc");

    let (state, effects) = finish(
        state,
        slow_search,
        Err(ApiError::new(FailureKind::HttpStatus(401), "expired")),
    );

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(started_search(&effects).1, "abc");
    assert_eq!(state.error_message(), None);
}

#[test]
fn abandoned_search_error_still_reaches_interceptor() {
    init_logging();
    let (state, calls) = counting_box();
    let (state, effects) = type_text(state, "ab");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);
    let (state, _) = update(state, SearchMsg::SelectionCleared);

    let (state, effects) = finish(
        state,
        search,
        Err(ApiError::new(FailureKind::HttpStatus(401), "expired")),
    );

    assert!(effects.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(state.error_message(), None);
    assert_eq!(state.view().status, None);
}

#[test]
fn abandoned_search_is_reported_idle_until_new_text_arrives() {
    init_logging();
    let (state, effects) = type_text(search_box(false), "foo");
    let (state, effects) = fire(state, armed_timer(&effects));
    let (search, _) = started_search(&effects);

    let (state, _) = update(state, SearchMsg::SelectionCleared);
    assert!(state.is_searching());
    assert_eq!(state.view().phase, SearchPhase::Idle);
    assert_eq!(state.view().status, None);

    // New text waits for the abandoned search, which counts as searching again.
    let (state, effects) = type_text(state, "bar");
    assert_eq!(effects, vec![SearchEffect::SelectionChanged(None)]);
    assert_eq!(state.view().phase, SearchPhase::Searching { search });
    assert_eq!(state.view().status, Some(StatusNode::Loading));

    let (state, effects) = finish(state, search, Ok(vec![item("Foo", "f")]));
    assert_eq!(started_search(&effects).1, "bar");
    assert!(state.suggestions().is_empty());
}
