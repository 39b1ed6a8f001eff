use std::fmt;

use thiserror::Error;

/// Normalized failure surfaced by any remote call.
///
/// `code` is the machine-readable code from a structured API error body, when
/// the server sent one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", format_error(self))]
pub struct ApiError {
    pub kind: FailureKind,
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    InvalidResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
        }
    }
}

pub const SESSION_EXPIRED_CODE: &str = "session_expired";

/// Turns an error into the text shown in an error banner.
pub fn format_error(error: &ApiError) -> String {
    let message = error.message.trim();
    match (&error.code, message.is_empty()) {
        (Some(code), false) => format!("{message} ({code})"),
        (Some(code), true) => format!("{} ({code})", error.kind),
        (None, false) => format!("{}: {message}", error.kind),
        (None, true) => error.kind.to_string(),
    }
}

pub fn is_session_expired(error: &ApiError) -> bool {
    error.kind == FailureKind::HttpStatus(401)
        || error.code.as_deref() == Some(SESSION_EXPIRED_CODE)
}

/// Application-wide hook that gets first refusal on every error before it is
/// displayed locally.
///
/// Returning `true` means the hook performed a global side effect (a redirect
/// to the login page, for example) and local display must be suppressed.
pub trait ErrorInterceptor: Send + Sync {
    fn intercept(&self, error: &ApiError) -> bool;
}

impl<F> ErrorInterceptor for F
where
    F: Fn(&ApiError) -> bool + Send + Sync,
{
    fn intercept(&self, error: &ApiError) -> bool {
        self(error)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoInterception;

impl ErrorInterceptor for NoInterception {
    fn intercept(&self, _error: &ApiError) -> bool {
        false
    }
}

/// Runs the interceptor and returns the message to display, or `None` when
/// the error was handled globally.
pub(crate) fn surface_error(
    interceptor: &dyn ErrorInterceptor,
    error: &ApiError,
) -> Option<String> {
    if interceptor.intercept(error) {
        return None;
    }
    Some(format_error(error))
}
