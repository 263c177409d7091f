//! Worker status and metrics projections plus the KPI strings the
//! dashboard strip renders.

use serde_json::Value;

use crate::fields::{pick, pick_bool, pick_f64, pick_i64, pick_str};
use crate::format::{fmt_ms, fmt_number, fmt_opt_number, fmt_tokens, PLACEHOLDER};

/// Projected worker status snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub enabled: bool,
    pub is_leader: bool,
    pub paused: bool,
    pub dry_run: bool,
    pub worker_id: String,
    pub model: String,
    pub tick_display: String,
    pub queued_total: Option<i64>,
    pub dead_letter_total: Option<i64>,
}

/// Project a raw status payload. Absent booleans read as `false`.
#[must_use]
pub fn derive_status_view(status: &Value) -> StatusView {
    let health = pick(status, &["health", "Health"]);
    StatusView {
        enabled: pick_bool(status, &["enabled", "Enabled"]),
        is_leader: pick_bool(status, &["is_leader", "IsLeader"]),
        paused: pick_bool(status, &["paused", "Paused"]),
        dry_run: pick_bool(status, &["dry_run", "DryRun"]),
        worker_id: display_string(pick_str(status, &["worker_id", "WorkerID"])),
        model: display_string(pick_str(status, &["model", "Model"])),
        tick_display: tick_display(pick(status, &["tick_interval", "TickInterval"])),
        queued_total: health.and_then(|h| pick_i64(h, &["queued_total", "QueuedTotal"])),
        dead_letter_total: health
            .and_then(|h| pick_i64(h, &["dead_letter_total", "DeadLetterTotal"])),
    }
}

/// Projected metrics summary. Every field is optional; the KPI strings
/// render the placeholder for absent values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsView {
    pub success_rate: Option<f64>,
    pub average_tokens_per_run: Option<f64>,
    pub p95_latency_ms: Option<i64>,
    pub runs_last_hour: Option<i64>,
    pub top_failure_reasons: Vec<(String, i64)>,
}

/// Project a raw metrics payload.
#[must_use]
pub fn derive_metrics_view(metrics: &Value) -> MetricsView {
    MetricsView {
        success_rate: pick_f64(metrics, &["success_rate", "SuccessRate"]),
        average_tokens_per_run: pick_f64(
            metrics,
            &["average_tokens_per_run", "AverageTokensPerRun"],
        ),
        p95_latency_ms: pick_i64(metrics, &["p95_latency_ms", "P95LatencyMs"]),
        runs_last_hour: pick_i64(metrics, &["runs_last_hour", "RunsLastHour"]),
        top_failure_reasons: failure_reasons(metrics),
    }
}

fn failure_reasons(metrics: &Value) -> Vec<(String, i64)> {
    let Some(entries) =
        pick(metrics, &["top_failure_reasons", "TopFailureReasons"]).and_then(Value::as_array)
    else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let reason = pick_str(entry, &["reason", "Reason", "error_class", "ErrorClass"])?;
            let count = pick_i64(entry, &["count", "Count"]).unwrap_or(0);
            Some((reason, count))
        })
        .collect()
}

/// The four dashboard KPI strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KpiSet {
    pub success_rate: String,
    pub avg_tokens: String,
    pub p95_latency: String,
    pub runs_last_hour: String,
}

/// Render KPI strings. `None` means metrics have not loaded at all, which
/// renders every slot as the placeholder; a loaded summary with an absent
/// rate renders as `0.0%`, matching the service's own dashboard.
#[must_use]
pub fn derive_kpis(metrics: Option<&MetricsView>) -> KpiSet {
    let Some(metrics) = metrics else {
        return KpiSet {
            success_rate: PLACEHOLDER.to_string(),
            avg_tokens: PLACEHOLDER.to_string(),
            p95_latency: PLACEHOLDER.to_string(),
            runs_last_hour: PLACEHOLDER.to_string(),
        };
    };
    KpiSet {
        success_rate: format!("{:.1}%", metrics.success_rate.unwrap_or(0.0) * 100.0),
        avg_tokens: fmt_tokens(metrics.average_tokens_per_run.map(|t| t.round() as i64)),
        p95_latency: fmt_ms(metrics.p95_latency_ms),
        runs_last_hour: fmt_opt_number(metrics.runs_last_hour),
    }
}

fn display_string(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => PLACEHOLDER.to_string(),
    }
}

fn tick_display(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        // The service marshals durations as integer nanoseconds.
        Some(v) if v.is_i64() || v.is_u64() || v.is_f64() => {
            let nanos = v.as_i64().unwrap_or(0);
            if nanos >= 1_000_000_000 {
                format!("{}s", fmt_number(nanos / 1_000_000_000))
            } else {
                format!("{}ms", fmt_number(nanos / 1_000_000))
            }
        }
        _ => PLACEHOLDER.to_string(),
    }
}
