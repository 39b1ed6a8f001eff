use console_core::{is_session_expired, ApiError, ErrorInterceptor};
use console_logging::console_warn;
use tokio::sync::mpsc;

/// Claims session-expiry errors and reports them on a channel so the
/// application can send the user back to the login page. Claimed errors are
/// not shown locally.
#[derive(Debug, Clone)]
pub struct SessionExpiredRedirect {
    tx: mpsc::UnboundedSender<ApiError>,
}

impl SessionExpiredRedirect {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ApiError>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ErrorInterceptor for SessionExpiredRedirect {
    fn intercept(&self, error: &ApiError) -> bool {
        if !is_session_expired(error) {
            return false;
        }
        console_warn!("session expired: {}", error);
        let _ = self.tx.send(error.clone());
        true
    }
}
