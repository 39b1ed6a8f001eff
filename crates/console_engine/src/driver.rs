use std::sync::Arc;

use console_core::{
    update, ApiError, SearchBox, SearchBoxView, SearchEffect, SearchId, SearchMsg, SuggestionItem,
    TimerId,
};
use console_logging::{console_debug, console_trace, console_warn};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

/// Data source behind a search field.
#[async_trait::async_trait]
pub trait SearchSource<I>: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<I>, ApiError>;
}

enum DriverCommand {
    TextChanged(String),
    Select { key: String },
    ClearSelection,
}

impl DriverCommand {
    fn into_msg<I>(self) -> SearchMsg<I> {
        match self {
            DriverCommand::TextChanged(text) => SearchMsg::TextChanged(text),
            DriverCommand::Select { key } => SearchMsg::SuggestionSelected { key },
            DriverCommand::ClearSelection => SearchMsg::SelectionCleared,
        }
    }
}

/// Handle to a search box running on its own tokio task.
///
/// The task owns the state and executes the effects `update` returns: the
/// debounce timer and at most one search at a time. Dropping the handle stops
/// the task; a search still running is left to finish and its answer dropped.
pub struct SearchDriver<I> {
    cmd_tx: mpsc::UnboundedSender<DriverCommand>,
    view_rx: watch::Receiver<SearchBoxView>,
    selection_rx: mpsc::UnboundedReceiver<Option<I>>,
}

impl<I> SearchDriver<I>
where
    I: SuggestionItem + Clone + Send + Sync + 'static,
{
    /// Spawns the driver task. Must be called from within a tokio runtime.
    pub fn spawn(state: SearchBox<I>, source: Arc<dyn SearchSource<I>>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(state.view());
        let (selection_tx, selection_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_driver(state, source, cmd_rx, view_tx, selection_tx));

        Self {
            cmd_tx,
            view_rx,
            selection_rx,
        }
    }
}

impl<I> SearchDriver<I> {
    pub fn text_changed(&self, text: impl Into<String>) {
        let _ = self.cmd_tx.send(DriverCommand::TextChanged(text.into()));
    }

    pub fn select(&self, key: impl Into<String>) {
        let _ = self.cmd_tx.send(DriverCommand::Select { key: key.into() });
    }

    pub fn clear_selection(&self) {
        let _ = self.cmd_tx.send(DriverCommand::ClearSelection);
    }

    /// Latest rendered view; updated whenever the search box changes.
    pub fn view(&self) -> watch::Receiver<SearchBoxView> {
        self.view_rx.clone()
    }

    /// Next published selection. `Some(None)` means the field went back to
    /// free text; `None` means the driver task has stopped.
    pub async fn next_selection(&mut self) -> Option<Option<I>> {
        self.selection_rx.recv().await
    }
}

async fn run_driver<I>(
    mut state: SearchBox<I>,
    source: Arc<dyn SearchSource<I>>,
    mut cmd_rx: mpsc::UnboundedReceiver<DriverCommand>,
    view_tx: watch::Sender<SearchBoxView>,
    selection_tx: mpsc::UnboundedSender<Option<I>>,
) where
    I: SuggestionItem + Clone + Send + Sync + 'static,
{
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(SearchId, Result<Vec<I>, ApiError>)>();
    let mut deadline: Option<(TimerId, Instant)> = None;

    loop {
        let msg = tokio::select! {
            command = cmd_rx.recv() => match command {
                Some(command) => command.into_msg(),
                None => break,
            },
            Some((search, result)) = done_rx.recv() => SearchMsg::SearchFinished { search, result },
            timer = debounce(deadline) => {
                deadline = None;
                SearchMsg::DebounceElapsed { timer }
            }
        };

        let (next, effects) = update(state, msg);
        state = next;

        for effect in effects {
            match effect {
                SearchEffect::ArmTimer { timer, delay } => {
                    console_trace!("debounce armed timer={} delay={:?}", timer, delay);
                    deadline = Some((timer, Instant::now() + delay));
                }
                SearchEffect::CancelTimer { timer } => {
                    if matches!(deadline, Some((armed, _)) if armed == timer) {
                        deadline = None;
                    }
                }
                SearchEffect::RunSearch { search, query } => {
                    console_debug!("search dispatched id={} query_len={}", search, query.len());
                    let source = source.clone();
                    let done_tx = done_tx.clone();
                    tokio::spawn(async move {
                        let result = source.search(&query).await;
                        if let Err(err) = &result {
                            console_warn!("search id={} failed: {}", search, err);
                        }
                        let _ = done_tx.send((search, result));
                    });
                }
                SearchEffect::SelectionChanged(selection) => {
                    let _ = selection_tx.send(selection);
                }
            }
        }

        if state.consume_dirty() {
            view_tx.send_replace(state.view());
        }
    }

    console_debug!("search driver stopped");
}

async fn debounce(deadline: Option<(TimerId, Instant)>) -> TimerId {
    match deadline {
        Some((timer, at)) => {
            sleep_until(at).await;
            timer
        }
        None => std::future::pending().await,
    }
}
