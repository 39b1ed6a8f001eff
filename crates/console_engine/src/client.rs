use std::marker::PhantomData;
use std::time::Duration;

use console_core::{ApiError, FailureKind};
use console_logging::console_debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::SearchSource;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Structured error body returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// JSON client for the management API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let mut base = settings.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `path` below the base url and appends `query` pairs.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        console_debug!("GET {}", url);

        let response = self.http.get(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        serde_json::from_slice(&body)
            .map_err(|err| ApiError::new(FailureKind::InvalidResponse, err.to_string()))
    }
}

/// Search endpoint answering `GET <path>?q=<query>` with a JSON array.
pub struct ApiSearchSource<I> {
    client: ApiClient,
    path: String,
    _item: PhantomData<fn() -> I>,
}

impl<I> ApiSearchSource<I> {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            _item: PhantomData,
        }
    }
}

#[async_trait::async_trait]
impl<I> SearchSource<I> for ApiSearchSource<I>
where
    I: DeserializeOwned + Send + 'static,
{
    async fn search(&self, query: &str) -> Result<Vec<I>, ApiError> {
        self.client.get_json(&self.path, &[("q", query)]).await
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let kind = FailureKind::HttpStatus(status.as_u16());
    let fallback = || {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            text
        }
    };

    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { code, message }) => ApiError {
            kind,
            code,
            message: message.unwrap_or_else(fallback),
        },
        Err(_) => ApiError::new(kind, fallback()),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
