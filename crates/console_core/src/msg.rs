use crate::{ApiError, SearchId, TimerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMsg<I> {
    /// User edited the search field.
    TextChanged(String),
    /// The debounce timer armed by `SearchEffect::ArmTimer` fired.
    DebounceElapsed { timer: TimerId },
    /// The data source answered the search started by `SearchEffect::RunSearch`.
    SearchFinished {
        search: SearchId,
        result: Result<Vec<I>, ApiError>,
    },
    /// User picked a suggestion by key.
    SuggestionSelected { key: String },
    /// The consumer dropped its selection; start over with an empty field.
    SelectionCleared,
}
