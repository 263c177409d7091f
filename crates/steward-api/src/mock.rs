//! Mock steward service for unit testing.
//!
//! Provides a configurable mock that records all calls, returns
//! pre-configured responses, and can delay individual operations so that
//! callers can exercise overlap and supersession behavior.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::service::StewardApi;
use crate::types::{EventsPage, ModeChange, RunQuery, RunsPage};

/// A recorded call to the mock service.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Status,
    Metrics,
    Runs(RunQuery),
    JobEvents(String),
    RunOnce,
    SetMode(ModeChange),
    RetryJob(String),
    CancelJob(String),
}

/// Mock implementation of `StewardApi` for testing.
///
/// The canned run list acts as the service's backing table: `runs` slices it
/// by the query's offset/limit and echoes the paging back, so paging logic
/// can be tested without a live service.
pub struct MockStewardApi {
    status: Mutex<Value>,
    metrics: Mutex<Value>,
    runs: Mutex<Vec<Value>>,
    events_by_job: Mutex<HashMap<String, Vec<Value>>>,
    calls: Mutex<Vec<MockCall>>,
    status_error: Mutex<Option<ApiError>>,
    metrics_error: Mutex<Option<ApiError>>,
    runs_error: Mutex<Option<ApiError>>,
    events_error: Mutex<Option<ApiError>>,
    run_once_error: Mutex<Option<ApiError>>,
    mode_error: Mutex<Option<ApiError>>,
    retry_error: Mutex<Option<ApiError>>,
    cancel_error: Mutex<Option<ApiError>>,
    runs_delay: Mutex<Option<Duration>>,
    events_delay: Mutex<Option<Duration>>,
    action_delay: Mutex<Option<Duration>>,
}

impl Default for MockStewardApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStewardApi {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(json!({})),
            metrics: Mutex::new(json!({})),
            runs: Mutex::new(Vec::new()),
            events_by_job: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            status_error: Mutex::new(None),
            metrics_error: Mutex::new(None),
            runs_error: Mutex::new(None),
            events_error: Mutex::new(None),
            run_once_error: Mutex::new(None),
            mode_error: Mutex::new(None),
            retry_error: Mutex::new(None),
            cancel_error: Mutex::new(None),
            runs_delay: Mutex::new(None),
            events_delay: Mutex::new(None),
            action_delay: Mutex::new(None),
        }
    }

    /// Set the canned status payload.
    pub fn with_status(self, status: Value) -> Self {
        set_value(&self.status, status);
        self
    }

    /// Set the canned metrics payload.
    pub fn with_metrics(self, metrics: Value) -> Self {
        set_value(&self.metrics, metrics);
        self
    }

    /// Set the canned backing run list (sliced per query paging).
    pub fn with_runs(self, runs: Vec<Value>) -> Self {
        set_value(&self.runs, runs);
        self
    }

    /// Set the canned events for one job.
    pub fn with_job_events(self, job_id: &str, events: Vec<Value>) -> Self {
        match self.events_by_job.lock() {
            Ok(mut map) => {
                map.insert(job_id.to_string(), events);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(job_id.to_string(), events);
            }
        }
        self
    }

    /// Configure status to return an error once.
    pub fn with_status_error(self, err: ApiError) -> Self {
        set_value(&self.status_error, Some(err));
        self
    }

    /// Configure metrics to return an error once.
    pub fn with_metrics_error(self, err: ApiError) -> Self {
        set_value(&self.metrics_error, Some(err));
        self
    }

    /// Configure runs to return an error once.
    pub fn with_runs_error(self, err: ApiError) -> Self {
        set_value(&self.runs_error, Some(err));
        self
    }

    /// Configure job_events to return an error once.
    pub fn with_events_error(self, err: ApiError) -> Self {
        set_value(&self.events_error, Some(err));
        self
    }

    /// Configure run_once to return an error once.
    pub fn with_run_once_error(self, err: ApiError) -> Self {
        set_value(&self.run_once_error, Some(err));
        self
    }

    /// Configure set_mode to return an error once.
    pub fn with_mode_error(self, err: ApiError) -> Self {
        set_value(&self.mode_error, Some(err));
        self
    }

    /// Configure retry_job to return an error once.
    pub fn with_retry_error(self, err: ApiError) -> Self {
        set_value(&self.retry_error, Some(err));
        self
    }

    /// Configure cancel_job to return an error once.
    pub fn with_cancel_error(self, err: ApiError) -> Self {
        set_value(&self.cancel_error, Some(err));
        self
    }

    /// Delay every runs call by the given duration.
    pub fn with_runs_delay(self, delay: Duration) -> Self {
        set_value(&self.runs_delay, Some(delay));
        self
    }

    /// Delay every job_events call by the given duration.
    pub fn with_events_delay(self, delay: Duration) -> Self {
        set_value(&self.events_delay, Some(delay));
        self
    }

    /// Delay every mutating call (run_once/set_mode/retry/cancel) by the
    /// given duration.
    pub fn with_action_delay(self, delay: Duration) -> Self {
        set_value(&self.action_delay, Some(delay));
        self
    }

    /// Replace the backing run list after construction.
    pub fn set_runs(&self, runs: Vec<Value>) {
        set_value(&self.runs, runs);
    }

    /// Return all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        match self.calls.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Return the number of recorded calls.
    pub fn call_count(&self) -> usize {
        match self.calls.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn record(&self, call: MockCall) {
        match self.calls.lock() {
            Ok(mut guard) => guard.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }

    fn take_error(lock: &Mutex<Option<ApiError>>) -> Option<ApiError> {
        match lock.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    async fn maybe_delay(lock: &Mutex<Option<Duration>>) {
        let delay = match lock.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn set_value<T>(lock: &Mutex<T>, value: T) {
    match lock.lock() {
        Ok(mut guard) => *guard = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

fn clone_value<T: Clone>(lock: &Mutex<T>) -> T {
    match lock.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Helper to create a minimal run record with sensible defaults.
pub fn test_run(id: &str, job_id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "job_id": job_id,
        "status": status,
        "job_type": "consolidation",
        "project_id": "demo",
        "model": "gpt-x",
        "total_tokens": 100,
        "latency_ms": 250,
        "created_at": "2025-06-01T12:00:00Z",
        "input": {},
        "output": {},
    })
}

#[async_trait]
impl StewardApi for MockStewardApi {
    async fn status(&self) -> Result<Value, ApiError> {
        self.record(MockCall::Status);
        if let Some(err) = Self::take_error(&self.status_error) {
            return Err(err);
        }
        Ok(clone_value(&self.status))
    }

    async fn metrics(&self) -> Result<Value, ApiError> {
        self.record(MockCall::Metrics);
        if let Some(err) = Self::take_error(&self.metrics_error) {
            return Err(err);
        }
        Ok(clone_value(&self.metrics))
    }

    async fn runs(&self, query: RunQuery) -> Result<RunsPage, ApiError> {
        self.record(MockCall::Runs(query.clone()));
        Self::maybe_delay(&self.runs_delay).await;
        if let Some(err) = Self::take_error(&self.runs_error) {
            return Err(err);
        }
        let all = clone_value(&self.runs);
        let page: Vec<Value> = all
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok(RunsPage {
            runs: page,
            limit: Some(query.limit),
            offset: Some(query.offset),
        })
    }

    async fn job_events(&self, job_id: &str) -> Result<EventsPage, ApiError> {
        self.record(MockCall::JobEvents(job_id.to_string()));
        Self::maybe_delay(&self.events_delay).await;
        if let Some(err) = Self::take_error(&self.events_error) {
            return Err(err);
        }
        let events = match self.events_by_job.lock() {
            Ok(guard) => guard.get(job_id).cloned().unwrap_or_default(),
            Err(poisoned) => poisoned.into_inner().get(job_id).cloned().unwrap_or_default(),
        };
        Ok(EventsPage { events })
    }

    async fn run_once(&self) -> Result<(), ApiError> {
        self.record(MockCall::RunOnce);
        Self::maybe_delay(&self.action_delay).await;
        if let Some(err) = Self::take_error(&self.run_once_error) {
            return Err(err);
        }
        Ok(())
    }

    async fn set_mode(&self, mode: ModeChange) -> Result<(), ApiError> {
        self.record(MockCall::SetMode(mode));
        Self::maybe_delay(&self.action_delay).await;
        if let Some(err) = Self::take_error(&self.mode_error) {
            return Err(err);
        }
        Ok(())
    }

    async fn retry_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.record(MockCall::RetryJob(job_id.to_string()));
        Self::maybe_delay(&self.action_delay).await;
        if let Some(err) = Self::take_error(&self.retry_error) {
            return Err(err);
        }
        Ok(())
    }

    async fn cancel_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.record(MockCall::CancelJob(job_id.to_string()));
        Self::maybe_delay(&self.action_delay).await;
        if let Some(err) = Self::take_error(&self.cancel_error) {
            return Err(err);
        }
        Ok(())
    }
}
