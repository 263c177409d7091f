//! Steward service trait: the primary abstraction for console operations.
//!
//! Implementations can run against the steward HTTP surface or be mocked
//! for testing.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{EventsPage, ModeChange, RunQuery, RunsPage};

/// The steward service interface.
///
/// All operations are async to support both the HTTP transport and test
/// doubles. Read operations return raw JSON payloads; the caller's
/// projection layer is responsible for field resolution and display
/// fallbacks.
#[async_trait]
pub trait StewardApi: Send + Sync {
    /// Fetch the worker status snapshot (enabled/paused/dry-run, leadership,
    /// queue health).
    async fn status(&self) -> Result<Value, ApiError>;

    /// Fetch the aggregate metrics summary.
    async fn metrics(&self) -> Result<Value, ApiError>;

    /// List one page of runs matching the query filters.
    async fn runs(&self, query: RunQuery) -> Result<RunsPage, ApiError>;

    /// Fetch the recorded events for a single job, in service order.
    async fn job_events(&self, job_id: &str) -> Result<EventsPage, ApiError>;

    /// Trigger one immediate worker pass.
    async fn run_once(&self) -> Result<(), ApiError>;

    /// Replace the worker mode (paused and dry-run together).
    async fn set_mode(&self, mode: ModeChange) -> Result<(), ApiError>;

    /// Re-enqueue a finished job for another attempt.
    async fn retry_job(&self, job_id: &str) -> Result<(), ApiError>;

    /// Cancel a queued or running job.
    async fn cancel_job(&self, job_id: &str) -> Result<(), ApiError>;
}
