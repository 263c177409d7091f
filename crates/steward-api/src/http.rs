//! HTTP transport implementing `StewardApi` against the steward REST surface.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::service::StewardApi;
use crate::types::{EventsPage, ModeChange, RunQuery, RunsPage, MAX_RUNS_LIMIT};

/// Header carrying the admin token for mutating operations.
pub const ADMIN_TOKEN_HEADER: &str = "X-Steward-Admin-Token";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Sent as `X-Steward-Admin-Token` on mutating calls when set. Read
    /// calls never carry it.
    pub admin_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            admin_token: default_admin_token(),
        }
    }
}

/// Steward service implementation backed by the HTTP/JSON transport.
pub struct HttpStewardApi {
    config: HttpConfig,
    client: reqwest::Client,
}

impl HttpStewardApi {
    pub fn new(config: HttpConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("build http client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn with_defaults() -> Result<Self, ApiError> {
        Self::new(HttpConfig::default())
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}{path}")
    }

    fn with_admin_token(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.admin_token {
            Some(token) => request.header(ADMIN_TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let mut request = self.client.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Mutating POST with no body. Discards the acknowledgement payload.
    async fn post_mutation(&self, path: &str) -> Result<(), ApiError> {
        let request = self.with_admin_token(self.client.post(self.url(path)));
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl StewardApi for HttpStewardApi {
    async fn status(&self) -> Result<Value, ApiError> {
        self.get_json("/steward/status", &[]).await
    }

    async fn metrics(&self) -> Result<Value, ApiError> {
        self.get_json("/steward/metrics", &[]).await
    }

    async fn runs(&self, query: RunQuery) -> Result<RunsPage, ApiError> {
        if query.limit == 0 || query.limit > MAX_RUNS_LIMIT {
            return Err(ApiError::InvalidArgument(format!(
                "limit must be between 1 and {MAX_RUNS_LIMIT}"
            )));
        }
        let body = self.get_json("/steward/runs", &query.to_pairs()).await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn job_events(&self, job_id: &str) -> Result<EventsPage, ApiError> {
        if job_id.is_empty() {
            return Err(ApiError::InvalidArgument("job id is required".into()));
        }
        let body = self
            .get_json(&format!("/steward/jobs/{job_id}/events"), &[])
            .await?;
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn run_once(&self) -> Result<(), ApiError> {
        self.post_mutation("/steward/run-once").await
    }

    async fn set_mode(&self, mode: ModeChange) -> Result<(), ApiError> {
        let request = self.with_admin_token(self.client.put(self.url("/steward/mode")));
        let response = request
            .json(&mode)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    async fn retry_job(&self, job_id: &str) -> Result<(), ApiError> {
        if job_id.is_empty() {
            return Err(ApiError::InvalidArgument("job id is required".into()));
        }
        self.post_mutation(&format!("/steward/jobs/{job_id}/retry"))
            .await
    }

    async fn cancel_job(&self, job_id: &str) -> Result<(), ApiError> {
        if job_id.is_empty() {
            return Err(ApiError::InvalidArgument("job id is required".into()));
        }
        self.post_mutation(&format!("/steward/jobs/{job_id}/cancel"))
            .await
    }
}

// -- helpers --

fn default_base_url() -> String {
    std::env::var("STEWARD_API_BASE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(|s| normalize_base(&s))
        .unwrap_or_else(|| "http://localhost:8420/api/v1".to_string())
}

fn default_admin_token() -> Option<String> {
    std::env::var("STEWARD_ADMIN_TOKEN")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

fn normalize_base(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

/// Map a non-success response to `ApiError::Status`, preferring the
/// service's own `{"error": ...}` body text over the canonical reason.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: Option<Value> = response.json().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
