//! Rate-limited Canvas gateway
//!
//! Every outbound request goes through [`CanvasGateway::send`]: it reserves a
//! slot in the shared [`RequestBudget`], sends the request with the bearer
//! token, records a [`CallRecord`] and retries transient failures with
//! exponential backoff. Rate-limit responses are surfaced, never retried.

use super::budget::RequestBudget;
use super::metrics::{CallRecord, GatewayMetrics};
use super::pagination::LinkHeader;
use super::params::QueryParams;
use crate::config::secret::bearer_header;
use crate::config::{CanvasConfig, RetryConfig, SecretString};
use crate::domain::{CanvasError, Result, SyncError};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

const RATE_LIMIT_REMAINING_HEADER: &str = "x-rate-limit-remaining";
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Full response of one successful call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub endpoint: String,
    pub status: u16,
    pub headers: HeaderMap,
    /// Decoded JSON; `Null` for an empty body
    pub body: Value,
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn link_header(&self) -> Option<&str> {
        self.headers.get(LINK).and_then(|v| v.to_str().ok())
    }

    pub fn links(&self) -> LinkHeader {
        self.link_header().map(LinkHeader::parse).unwrap_or_default()
    }

    pub fn has_next_page(&self) -> bool {
        self.links().next.is_some()
    }

    /// Decodes the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| {
            SyncError::Canvas(CanvasError::InvalidResponse(format!(
                "{}: {e}",
                self.endpoint
            )))
        })
    }
}

/// Canvas REST client bound to one shared request budget
///
/// Clones share the budget, the metrics and the HTTP connection pool.
#[derive(Clone)]
pub struct CanvasGateway {
    client: Client,
    api_root: Url,
    token: SecretString,
    retry: RetryConfig,
    per_page: u32,
    max_pages: u32,
    budget: Arc<RequestBudget>,
    metrics: Arc<GatewayMetrics>,
    scope_calls: Option<Arc<AtomicU64>>,
}

impl std::fmt::Debug for CanvasGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasGateway")
            .field("api_root", &self.api_root.as_str())
            .field("per_page", &self.per_page)
            .field("max_pages", &self.max_pages)
            .field("budget_limit", &self.budget.limit())
            .finish_non_exhaustive()
    }
}

impl CanvasGateway {
    /// Builds a gateway with its own budget from `config.rate_limit`
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] for an unusable base URL or when
    /// the HTTP client cannot be built.
    pub fn new(config: &CanvasConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_root: api_root(&config.base_url)?,
            token: config.api_token.clone(),
            retry: config.retry.clone(),
            per_page: config.per_page,
            max_pages: config.max_pages,
            budget: Arc::new(RequestBudget::from_config(&config.rate_limit)),
            metrics: Arc::new(GatewayMetrics::new()),
            scope_calls: None,
        })
    }

    /// Replaces the budget, e.g. to share one across several gateways
    pub fn with_budget(mut self, budget: Arc<RequestBudget>) -> Self {
        self.budget = budget;
        self
    }

    /// Clone that shares budget and metrics but tallies its own calls
    pub fn scoped(&self) -> Self {
        let mut scoped = self.clone();
        scoped.scope_calls = Some(Arc::new(AtomicU64::new(0)));
        scoped
    }

    /// Attempts sent through this gateway (or this scope)
    pub fn calls_issued(&self) -> u64 {
        match &self.scope_calls {
            Some(calls) => calls.load(Ordering::Relaxed),
            None => self.budget.total_issued(),
        }
    }

    pub fn budget(&self) -> &Arc<RequestBudget> {
        &self.budget
    }

    pub fn metrics(&self) -> &Arc<GatewayMetrics> {
        &self.metrics
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Zeroes the budget, the metrics and this scope's tally
    pub fn reset(&self) {
        self.budget.reset();
        self.metrics.reset();
        if let Some(calls) = &self.scope_calls {
            calls.store(0, Ordering::Relaxed);
        }
    }

    /// Sends a GET request, retrying transient failures
    ///
    /// `endpoint` is relative to `/api/v1/`; a leading `/api/v1/` is accepted
    /// and ignored.
    pub async fn send(&self, endpoint: &str, params: &QueryParams) -> Result<ApiResponse> {
        let url = self.url_for(endpoint)?;
        let max_attempts = self.retry.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.send_once(endpoint, &url, params).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    crate::log_retry_attempt!(endpoint, attempt, max_attempts, e);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::debug!(endpoint = %endpoint, attempt, error = %e, "Request failed");
                    return Err(e.into());
                }
            }
        }
    }

    async fn send_once(
        &self,
        endpoint: &str,
        url: &Url,
        params: &QueryParams,
    ) -> std::result::Result<ApiResponse, CanvasError> {
        self.budget.acquire().await?;
        if let Some(calls) = &self.scope_calls {
            calls.fetch_add(1, Ordering::Relaxed);
        }

        let started = Instant::now();
        let sent = self
            .client
            .get(url.clone())
            .query(params.pairs())
            .header(AUTHORIZATION, bearer_header(&self.token))
            .header(ACCEPT, "application/json")
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                self.metrics
                    .record(CallRecord::new(endpoint, started.elapsed(), None, false));
                return Err(transport_error(&e));
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        if let Some(remaining) = headers
            .get(RATE_LIMIT_REMAINING_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<f64>().ok())
        {
            self.metrics.note_rate_limit_remaining(remaining);
        }

        let text = response.text().await;
        let elapsed = started.elapsed();
        let text = match text {
            Ok(text) => text,
            Err(e) => {
                self.metrics
                    .record(CallRecord::new(endpoint, elapsed, Some(status.as_u16()), false));
                return Err(transport_error(&e));
            }
        };

        if !status.is_success() {
            self.metrics
                .record(CallRecord::new(endpoint, elapsed, Some(status.as_u16()), false));
            return Err(classify_status(status, endpoint, &text));
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(e) => {
                    self.metrics
                        .record(CallRecord::new(endpoint, elapsed, Some(status.as_u16()), false));
                    return Err(CanvasError::InvalidResponse(format!("{endpoint}: {e}")));
                }
            }
        };

        self.metrics
            .record(CallRecord::new(endpoint, elapsed, Some(status.as_u16()), true));
        tracing::debug!(
            endpoint = %endpoint,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Canvas request completed"
        );

        Ok(ApiResponse {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            headers,
            body,
            elapsed,
        })
    }

    fn url_for(&self, endpoint: &str) -> Result<Url> {
        let path = endpoint.trim_start_matches('/');
        let path = path.strip_prefix("api/v1/").unwrap_or(path);
        self.api_root.join(path).map_err(|e| {
            SyncError::Configuration(format!("Invalid endpoint '{endpoint}': {e}"))
        })
    }
}

fn api_root(base_url: &str) -> Result<Url> {
    let mut root = Url::parse(base_url).map_err(|e| {
        SyncError::Configuration(format!("Invalid Canvas base URL '{base_url}': {e}"))
    })?;
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    root.join("api/v1/")
        .map_err(|e| SyncError::Configuration(format!("Invalid Canvas base URL '{base_url}': {e}")))
}

fn transport_error(e: &reqwest::Error) -> CanvasError {
    if e.is_timeout() {
        CanvasError::Timeout(e.to_string())
    } else {
        CanvasError::ConnectionFailed(e.to_string())
    }
}

/// Maps a non-success status to the error taxonomy
///
/// Canvas signals throttling either with 429 or with a 403 whose body reads
/// "Rate Limit Exceeded".
pub(crate) fn classify_status(status: StatusCode, endpoint: &str, body: &str) -> CanvasError {
    let code = status.as_u16();
    let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();

    match status {
        StatusCode::TOO_MANY_REQUESTS => CanvasError::RateLimited {
            status: code,
            message,
        },
        StatusCode::FORBIDDEN if body.to_lowercase().contains("rate limit exceeded") => {
            CanvasError::RateLimited {
                status: code,
                message,
            }
        }
        StatusCode::UNAUTHORIZED => CanvasError::AuthenticationFailed(format!("{endpoint}: {message}")),
        StatusCode::NOT_FOUND => CanvasError::NotFound(endpoint.to_string()),
        s if s.is_server_error() => CanvasError::ServerError {
            status: code,
            message,
        },
        _ => CanvasError::ClientError {
            status: code,
            message,
        },
    }
}
