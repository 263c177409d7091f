//! Redaction marker scanning over payload trees.
//!
//! The persistence layer masks sensitive payload content and leaves two
//! kinds of markers behind: `REDACTED`-bearing replacement strings and a
//! `_redaction_reasons` list on the object that was scrubbed. These
//! scanners surface both so the console can flag redacted runs.
//!
//! Input is serialized data and therefore tree-shaped; recursion is still
//! capped so a pathologically deep payload cannot overflow the stack.

use std::collections::BTreeSet;

use serde_json::Value;

/// Branches deeper than this are not descended.
pub const MAX_SCAN_DEPTH: usize = 64;

/// Reason recorded when a string leaf carries the literal `REDACTED` marker.
pub const STRING_MARKER_REASON: &str = "string_marker";

/// True if any string leaf in the tree contains `"redact"`,
/// case-insensitively.
#[must_use]
pub fn has_redaction(value: &Value) -> bool {
    scan_for_marker(value, 0)
}

fn scan_for_marker(value: &Value, depth: usize) -> bool {
    if depth > MAX_SCAN_DEPTH {
        return false;
    }
    match value {
        Value::String(s) => s.to_ascii_lowercase().contains("redact"),
        Value::Array(items) => items.iter().any(|item| scan_for_marker(item, depth + 1)),
        Value::Object(map) => map.values().any(|item| scan_for_marker(item, depth + 1)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Collect the distinct redaction reasons recorded anywhere in the tree.
///
/// Objects carrying a `_redaction_reasons` list contribute each element;
/// string leaves containing the literal `REDACTED` contribute the generic
/// `string_marker` reason.
pub fn collect_redaction_reasons(value: &Value, acc: &mut BTreeSet<String>) {
    collect_reasons(value, acc, 0);
}

fn collect_reasons(value: &Value, acc: &mut BTreeSet<String>, depth: usize) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    match value {
        Value::String(s) => {
            if s.contains("REDACTED") {
                acc.insert(STRING_MARKER_REASON.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_reasons(item, acc, depth + 1);
            }
        }
        Value::Object(map) => {
            if let Some(reasons) = map.get("_redaction_reasons").and_then(Value::as_array) {
                for reason in reasons {
                    match reason {
                        Value::String(s) => {
                            acc.insert(s.clone());
                        }
                        other => {
                            acc.insert(other.to_string());
                        }
                    }
                }
            }
            for item in map.values() {
                collect_reasons(item, acc, depth + 1);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
