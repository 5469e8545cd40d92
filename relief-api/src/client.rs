//! HTTP client for the relief server REST API.
//!
//! Handles base URL normalization, timeouts, exponential backoff retry on
//! gateway errors, and mapping `{"error": "..."}` bodies onto
//! `ReliefError::ServerError`.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use relief_core::config::ClientConfig;
use relief_core::error::{ReliefError, ReliefResult};

/// Uploads get this many times the normal timeout.
const UPLOAD_TIMEOUT_MULTIPLIER: u32 = 4;

/// Retry configuration for HTTP requests.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base delay between retries (doubles each attempt).
    pub base_delay: Duration,
    /// Maximum delay cap.
    pub max_delay: Duration,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        // Three attempts in total: 0 ms, then 500 ms, then 1 s later.
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(2),
            retryable_statuses: vec![502, 503, 504],
        }
    }
}

/// Error body the server sends with every non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for communicating with a relief server.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Server origin without a trailing slash, e.g. "http://127.0.0.1:3001".
    base_url: String,
    timeout: Duration,
    upload_timeout: Duration,
    retry_config: RetryConfig,
}

impl ApiClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> ReliefResult<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let inner = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| ReliefError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            base_url: normalize_base_url(&config.base_url),
            timeout,
            upload_timeout: timeout * UPLOAD_TIMEOUT_MULTIPLIER,
            retry_config: RetryConfig::default(),
        })
    }

    /// Set custom retry configuration.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn build_request(&self, method: Method, url: &str, body: Option<&serde_json::Value>) -> RequestBuilder {
        let mut builder = self.inner.request(method, url).timeout(self.timeout);
        if let Some(b) = body {
            builder = builder.json(b);
        }
        builder
    }

    /// Execute a request with exponential backoff retry.
    async fn request_with_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> ReliefResult<Response> {
        let url = self.url(path);
        debug!("{method} {path}");

        let mut last_error: Option<ReliefError> = None;

        for attempt in 0..=self.retry_config.max_retries {
            if attempt > 0 {
                let delay = self.calculate_retry_delay(attempt - 1);
                warn!(
                    "retrying {method} {path} (attempt {}/{}) after {:.1}s",
                    attempt + 1,
                    self.retry_config.max_retries + 1,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }

            match self.build_request(method.clone(), &url, body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if self.retry_config.retryable_statuses.contains(&status.as_u16())
                        && attempt < self.retry_config.max_retries
                    {
                        warn!("retryable status {} from {path}", status.as_u16());
                        last_error = Some(ReliefError::ServerError {
                            status: status.as_u16(),
                            message: format!("retryable status {status}"),
                        });
                        continue;
                    }
                    return Self::check_status(response).await;
                }
                Err(e) => {
                    let is_retryable = e.is_timeout() || e.is_connect();
                    let err = Self::classify_error(e);
                    if is_retryable && attempt < self.retry_config.max_retries {
                        warn!("retryable error on {path}: {err}");
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ReliefError::Http("max retries exceeded".into())))
    }

    /// Calculate retry delay with exponential backoff.
    fn calculate_retry_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.retry_config.base_delay.as_millis() as u64;
        let delay_ms = base_ms.saturating_mul(1u64 << attempt.min(32));
        let max_ms = self.retry_config.max_delay.as_millis() as u64;
        Duration::from_millis(delay_ms.min(max_ms))
    }

    // --- Raw HTTP methods ---

    pub async fn get(&self, path: &str) -> ReliefResult<Response> {
        self.request_with_retry(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &serde_json::Value) -> ReliefResult<Response> {
        self.request_with_retry(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &serde_json::Value) -> ReliefResult<Response> {
        self.request_with_retry(Method::PATCH, path, Some(body)).await
    }

    /// POST a multipart form. Forms cannot be cloned, so this is never retried.
    pub async fn post_multipart(&self, path: &str, form: reqwest::multipart::Form) -> ReliefResult<Response> {
        debug!("POST (multipart) {path}");
        let response = self
            .inner
            .post(self.url(path))
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(Self::classify_error)?;
        Self::check_status(response).await
    }

    // --- Typed helpers ---

    /// Deserialize a successful response body.
    pub async fn parse_response<T: DeserializeOwned>(response: Response) -> ReliefResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ReliefError::Serialization(format!("failed to parse response: {e}")))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ReliefResult<T> {
        let resp = self.get(path).await?;
        Self::parse_response(resp).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ReliefResult<T> {
        let resp = self.post(path, &serde_json::to_value(body)?).await?;
        Self::parse_response(resp).await
    }

    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ReliefResult<T> {
        let resp = self.patch(path, &serde_json::to_value(body)?).await?;
        Self::parse_response(resp).await
    }

    /// Turn a non-2xx response into `ServerError` carrying the server's message.
    async fn check_status(response: Response) -> ReliefResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(ReliefError::ServerError {
            status: status.as_u16(),
            message: error_message(status, &text),
        })
    }

    /// Classify a reqwest error into a ReliefError.
    fn classify_error(e: reqwest::Error) -> ReliefError {
        if e.is_timeout() {
            ReliefError::Http(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ReliefError::Http(format!("connection failed: {e}"))
        } else {
            ReliefError::Http(e.to_string())
        }
    }
}

/// Message for an error response: the `error` field when present, else the
/// raw body, else the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        trimmed.to_string()
    }
}

/// Strip trailing slashes and default the scheme to http.
fn normalize_base_url(address: &str) -> String {
    let trimmed = address.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
