//! Job event projection.
//!
//! Events arrive in service order and are never re-sorted here; the
//! timeline shows them exactly as recorded.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::fields::{pick, pick_str};

/// Render-ready projection of one job event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventView {
    pub id: Option<String>,
    pub event_type: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_raw: Option<String>,
    pub data: Value,
}

/// Project a raw event record. Total: missing fields degrade to defaults.
#[must_use]
pub fn derive_event_view(event: &Value) -> EventView {
    let created_raw = pick_str(event, &["CreatedAt", "created_at"]);
    let created_at = created_raw
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    EventView {
        id: pick_str(event, &["ID", "id"]),
        event_type: pick_str(event, &["EventType", "event_type"])
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "event".to_string()),
        created_at,
        created_raw,
        data: pick(event, &["Data", "data"])
            .cloned()
            .unwrap_or_else(|| json!({})),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::derive_event_view;

    #[test]
    fn projects_both_naming_conventions() {
        let pascal = derive_event_view(&json!({
            "ID": "e-1",
            "EventType": "job_started",
            "CreatedAt": "2025-06-01T12:00:00Z",
            "Data": {"attempt": 1},
        }));
        assert_eq!(pascal.id.as_deref(), Some("e-1"));
        assert_eq!(pascal.event_type, "job_started");
        assert!(pascal.created_at.is_some());
        assert_eq!(pascal.data, json!({"attempt": 1}));

        let snake = derive_event_view(&json!({
            "id": "e-2",
            "event_type": "job_finished",
            "data": {"ok": true},
        }));
        assert_eq!(snake.id.as_deref(), Some("e-2"));
        assert_eq!(snake.event_type, "job_finished");
    }

    #[test]
    fn empty_event_gets_generic_type_and_empty_data() {
        let view = derive_event_view(&json!({}));
        assert_eq!(view.id, None);
        assert_eq!(view.event_type, "event");
        assert_eq!(view.data, json!({}));
        assert_eq!(view.created_at, None);
    }
}
