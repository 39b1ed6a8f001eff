use std::fmt::Write;

use console_core::{AsyncResult, SearchBoxView, SearchPhase};

/// Text rendering of the status panel.
pub fn status_panel(status: &AsyncResult<serde_json::Value>) -> String {
    status
        .draw(|value| {
            let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!("Cluster status:\n{body}")
        })
        .unwrap_or_else(|| "Cluster status: not loaded".to_string())
}

pub fn search_view(view: &SearchBoxView) -> String {
    let mut out = String::new();
    let phase = match view.phase {
        SearchPhase::Idle => "idle",
        SearchPhase::DebouncePending { .. } => "waiting",
        SearchPhase::Searching { .. } => "searching",
    };
    let _ = writeln!(out, "search [{phase}] \"{}\"", view.text);
    if let Some(status) = &view.status {
        let _ = writeln!(out, "  {status}");
    }
    for (index, suggestion) in view.suggestions.iter().enumerate() {
        let _ = writeln!(out, "  :{} {} ({})", index + 1, suggestion.label, suggestion.key);
    }
    out
}
