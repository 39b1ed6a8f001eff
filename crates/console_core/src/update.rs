use crate::{SearchBox, SearchEffect, SearchMsg, SuggestionItem};

/// Pure update function: applies a message to a search box and returns the
/// effects the driver has to run.
pub fn update<I>(mut state: SearchBox<I>, msg: SearchMsg<I>) -> (SearchBox<I>, Vec<SearchEffect<I>>)
where
    I: SuggestionItem + Clone,
{
    let mut effects = Vec::new();
    match msg {
        SearchMsg::TextChanged(text) => {
            state.set_text(text.clone());
            effects.push(SearchEffect::SelectionChanged(None));
            state.queue_query(text, &mut effects);
        }
        SearchMsg::DebounceElapsed { timer } => {
            state.debounce_elapsed(timer, &mut effects);
        }
        SearchMsg::SearchFinished { search, result } => {
            state.search_finished(search, result, &mut effects);
        }
        SearchMsg::SuggestionSelected { key } => {
            let Some(item) = state.find_suggestion(&key).cloned() else {
                return (state, effects);
            };
            state.settle(item.suggestion().label, &mut effects);
            effects.push(SearchEffect::SelectionChanged(Some(item)));
        }
        SearchMsg::SelectionCleared => {
            state.settle(String::new(), &mut effects);
        }
    }

    (state, effects)
}
