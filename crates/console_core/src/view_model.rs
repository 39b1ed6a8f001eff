use std::fmt;

use crate::SearchPhase;

/// Renderable placeholder shown instead of data: a spinner while loading or a
/// danger banner after a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusNode {
    Loading,
    Error { message: String },
}

impl StatusNode {
    pub fn is_loading(&self) -> bool {
        matches!(self, StatusNode::Loading)
    }
}

impl fmt::Display for StatusNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusNode::Loading => write!(f, "Loading..."),
            StatusNode::Error { message } => write!(f, "Error: {message}"),
        }
    }
}

impl From<StatusNode> for String {
    fn from(node: StatusNode) -> Self {
        node.to_string()
    }
}

/// Display identity of a search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub key: String,
}

/// Projection from a domain item to the label/key pair the search box shows.
pub trait SuggestionItem {
    fn suggestion(&self) -> Suggestion;
}

impl SuggestionItem for Suggestion {
    fn suggestion(&self) -> Suggestion {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchBoxView {
    pub text: String,
    pub phase: SearchPhase,
    pub suggestions: Vec<Suggestion>,
    pub status: Option<StatusNode>,
}
