//! Console core: async result holder and the search box state machine.
//!
//! Nothing here performs IO. Fetches and timers are driven from outside
//! through `AsyncResult::begin_load`/`finish_load` and the search effects.
mod async_result;
mod effect;
mod error;
mod msg;
mod search_box;
mod update;
mod view_model;

pub use async_result::{AsyncResult, ChangeListener, LoadTicket};
pub use effect::SearchEffect;
pub use error::{
    format_error, is_session_expired, ApiError, ErrorInterceptor, FailureKind, NoInterception,
    SESSION_EXPIRED_CODE,
};
pub use msg::SearchMsg;
pub use search_box::{SearchBox, SearchConfig, SearchId, SearchPhase, TimerId, DEFAULT_DEBOUNCE};
pub use update::update;
pub use view_model::{SearchBoxView, StatusNode, Suggestion, SuggestionItem};
