use std::time::Duration;

use crate::{SearchId, TimerId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEffect<I> {
    ArmTimer { timer: TimerId, delay: Duration },
    CancelTimer { timer: TimerId },
    RunSearch { search: SearchId, query: String },
    /// Publish the discrete selection to the owner; `None` means free text.
    SelectionChanged(Option<I>),
}
