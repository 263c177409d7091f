//! Run record projection.
//!
//! `derive_run_view` is a total function from a raw run record to a
//! render-ready `RunView`: missing or malformed fields degrade to
//! placeholders, never errors, so a single bad record cannot break the
//! whole list.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::fields::{pick, pick_i64, pick_str};
use crate::format::{Tone, PLACEHOLDER};

/// Lifecycle status of a run, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
    DeadLetter,
    Cancelled,
    Unknown,
}

impl RunStatus {
    /// All concrete statuses, in the order the service's filter dropdown
    /// offers them.
    pub const ALL: [RunStatus; 6] = [
        RunStatus::Queued,
        RunStatus::Running,
        RunStatus::Succeeded,
        RunStatus::Failed,
        RunStatus::DeadLetter,
        RunStatus::Cancelled,
    ];

    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "running" => Self::Running,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "dead_letter" => Self::DeadLetter,
            "cancelled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::DeadLetter => "dead_letter",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }

    /// A run can be retried once it has finished unsuccessfully.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Failed | Self::DeadLetter | Self::Cancelled)
    }

    /// A run can be cancelled while it has not finished.
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Queued | Self::Running)
    }

    #[must_use]
    pub fn tone(&self) -> Tone {
        match self {
            Self::Succeeded => Tone::Positive,
            Self::Failed | Self::DeadLetter => Tone::Negative,
            Self::Running => Tone::Active,
            Self::Queued => Tone::Pending,
            Self::Cancelled => Tone::Muted,
            Self::Unknown => Tone::Default,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized, render-ready projection of one run record.
#[derive(Debug, Clone, PartialEq)]
pub struct RunView {
    pub id: Option<String>,
    pub job_id: Option<String>,
    pub job_type: String,
    pub project_id: String,
    pub model: String,
    pub status: RunStatus,
    pub total_tokens: Option<i64>,
    pub latency_ms: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_raw: Option<String>,
    pub input: Value,
    pub output: Value,
    pub decision: String,
    pub side_effect_summary: String,
    pub error_class: Option<String>,
    pub error_message: Option<String>,
    /// The record as received, retained for audit display.
    pub raw: Value,
}

/// Project a raw run record into a `RunView`. Total: never fails.
#[must_use]
pub fn derive_run_view(run: &Value) -> RunView {
    let input = pick(run, &["InputSnapshot", "input_snapshot", "input"])
        .cloned()
        .unwrap_or_else(|| json!({}));
    let output = pick(run, &["OutputSnapshot", "output_snapshot", "output"])
        .cloned()
        .unwrap_or_else(|| json!({}));

    let created_raw = pick_str(run, &["CreatedAt", "created_at"]);
    let created_at = created_raw.as_deref().and_then(parse_timestamp);

    let decision = pick_str(&output, &["decision", "action"])
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    RunView {
        id: pick_str(run, &["ID", "id"]),
        job_id: pick_str(run, &["JobID", "job_id"]),
        job_type: display_string(pick_str(run, &["JobType", "job_type"])),
        project_id: display_string(pick_str(run, &["ProjectID", "project_id"])),
        model: display_string(pick_str(run, &["Model", "model"])),
        status: pick_str(run, &["Status", "status"])
            .map(|s| RunStatus::parse(&s))
            .unwrap_or(RunStatus::Unknown),
        total_tokens: pick_i64(run, &["TotalTokens", "total_tokens"]),
        latency_ms: pick_i64(run, &["LatencyMs", "latency_ms"]),
        created_at,
        created_raw,
        decision,
        side_effect_summary: side_effect_summary(&output),
        input,
        output,
        error_class: pick_str(run, &["ErrorClass", "error_class"]),
        error_message: pick_str(run, &["ErrorMessage", "error_message"]),
        raw: run.clone(),
    }
}

/// First three side-effect labels joined, or the placeholder.
///
/// Each entry's label is its `type`, then `kind`, then `action`, then the
/// generic `"effect"`.
#[must_use]
pub fn side_effect_summary(output: &Value) -> String {
    let Some(effects) = output.get("side_effects").and_then(Value::as_array) else {
        return PLACEHOLDER.to_string();
    };
    if effects.is_empty() {
        return PLACEHOLDER.to_string();
    }
    effects
        .iter()
        .take(3)
        .map(|effect| {
            pick_str(effect, &["type", "kind", "action"])
                .unwrap_or_else(|| "effect".to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_string(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
