use std::sync::Arc;

use console_core::{
    AsyncResult, ErrorInterceptor, SearchBox, SearchBoxView, Suggestion, SuggestionItem,
};
use console_engine::{
    ApiClient, ApiSearchSource, SearchDriver, SessionExpiredRedirect, SharedResult,
};
use console_logging::{console_debug, console_info, console_warn};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use super::render;
use super::settings::ConsoleSettings;

/// A collection as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionHit {
    pub id: String,
    pub name: String,
}

impl SuggestionItem for CollectionHit {
    fn suggestion(&self) -> Suggestion {
        Suggestion {
            label: self.name.clone(),
            key: self.id.clone(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum InputCommand {
    Text(String),
    Select(usize),
    Clear,
    Reload,
}

fn parse_line(line: &str) -> InputCommand {
    match line.trim_end_matches(['\r', '\n']) {
        ":clear" => InputCommand::Clear,
        ":reload" => InputCommand::Reload,
        other => match other.strip_prefix(':').and_then(|n| n.parse::<usize>().ok()) {
            Some(index) if index > 0 => InputCommand::Select(index - 1),
            _ => InputCommand::Text(other.to_string()),
        },
    }
}

pub async fn run_app(settings: ConsoleSettings) -> anyhow::Result<()> {
    let client = ApiClient::new(settings.client_settings())?;
    console_info!("console connected to {}", client.base_url());

    let (redirect, mut expired_rx) = SessionExpiredRedirect::new();
    let interceptor: Arc<dyn ErrorInterceptor> = Arc::new(redirect);

    let status = SharedResult::new(
        AsyncResult::<serde_json::Value>::new()
            .with_interceptor(interceptor.clone())
            .with_on_change(|result: &AsyncResult<serde_json::Value>| {
                console_debug!("status changed loading={}", result.is_loading());
            }),
    );
    load_status(&status, &client, &settings.status_path).await;

    let search = SearchBox::new(settings.search_config()).with_interceptor(interceptor);
    let source = Arc::new(ApiSearchSource::<CollectionHit>::new(
        client.clone(),
        settings.search_path.clone(),
    ));
    let mut driver = SearchDriver::spawn(search, source);
    let mut view_rx = driver.view();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    InputCommand::Text(text) => driver.text_changed(text),
                    InputCommand::Select(index) => select_nth(&driver, &view_rx, index),
                    InputCommand::Clear => driver.clear_selection(),
                    InputCommand::Reload => {
                        let status = status.clone();
                        let client = client.clone();
                        let path = settings.status_path.clone();
                        tokio::spawn(async move { load_status(&status, &client, &path).await });
                    }
                }
            }
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = view_rx.borrow_and_update().clone();
                print!("{}", render::search_view(&view));
            }
            selection = driver.next_selection() => match selection {
                Some(Some(hit)) => println!("selected collection {} ({})", hit.name, hit.id),
                Some(None) => {}
                None => break,
            },
            Some(error) = expired_rx.recv() => {
                console_warn!("session expired: {}", error);
                println!("Session expired. Log in again at {}", client.base_url());
                break;
            }
        }
    }

    console_info!("console shutting down");
    Ok(())
}

async fn load_status(status: &SharedResult<serde_json::Value>, client: &ApiClient, path: &str) {
    status
        .load_while_keeping_old_result(|| client.get_json(path, &[]))
        .await;
    println!("{}", status.with(render::status_panel));
}

fn select_nth(
    driver: &SearchDriver<CollectionHit>,
    view_rx: &watch::Receiver<SearchBoxView>,
    index: usize,
) {
    let key = view_rx
        .borrow()
        .suggestions
        .get(index)
        .map(|suggestion| suggestion.key.clone());
    match key {
        Some(key) => driver.select(key),
        None => println!("no suggestion :{}", index + 1),
    }
}
