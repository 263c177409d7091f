//! Transport-agnostic request and response types.
//!
//! Run and event records stay raw JSON on purpose: the service has shipped
//! both PascalCase and snake_case field names, and resolving that belongs to
//! the consumer's projection layer, not the wire client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size for run listings, matching the service default.
pub const DEFAULT_RUNS_LIMIT: u32 = 50;

/// Maximum page size the service accepts for run listings.
pub const MAX_RUNS_LIMIT: u32 = 500;

/// Query parameters for listing runs.
///
/// Filter fields are sent verbatim; `None` or empty strings are omitted from
/// the request entirely so the service applies no constraint for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQuery {
    pub status: Option<String>,
    pub job_type: Option<String>,
    pub project_id: Option<String>,
    pub model: Option<String>,
    pub limit: u32,
    pub offset: u64,
}

impl Default for RunQuery {
    fn default() -> Self {
        Self {
            status: None,
            job_type: None,
            project_id: None,
            model: None,
            limit: DEFAULT_RUNS_LIMIT,
            offset: 0,
        }
    }
}

impl RunQuery {
    /// Query-string pairs in a stable order, skipping unset filters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        for (key, value) in [
            ("status", &self.status),
            ("job_type", &self.job_type),
            ("project_id", &self.project_id),
            ("model", &self.model),
        ] {
            if let Some(v) = value {
                if !v.is_empty() {
                    pairs.push((key, v.clone()));
                }
            }
        }
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs
    }
}

/// One page of run records plus the paging echo from the service.
///
/// Parsed leniently: a response without a `runs` array yields an empty page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunsPage {
    #[serde(default)]
    pub runs: Vec<Value>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u64>,
}

/// Events recorded for a single job, in service order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsPage {
    #[serde(default)]
    pub events: Vec<Value>,
}

/// Requested worker mode: both dimensions are sent together because the
/// service replaces the whole mode in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeChange {
    pub paused: bool,
    pub dry_run: bool,
}
