//! Ordered-fallback field access over dual-naming JSON records.
//!
//! The steward service has shipped records under both PascalCase and
//! snake_case field names. Every lookup in this crate goes through `pick`
//! with an ordered key list so the rest of the code never touches raw keys.
//! JSON `null` counts as absent, so formatting helpers can distinguish
//! "unknown" from a real value.

use serde_json::Value;

/// Return the first non-null value among `keys`, in order.
#[must_use]
pub fn pick<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = value.as_object()?;
    for key in keys {
        match obj.get(*key) {
            None | Some(Value::Null) => continue,
            Some(found) => return Some(found),
        }
    }
    None
}

/// String field under any of `keys`; non-string values count as absent.
#[must_use]
pub fn pick_str(value: &Value, keys: &[&str]) -> Option<String> {
    pick(value, keys)
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Integer field under any of `keys`; floats are truncated toward zero.
#[must_use]
pub fn pick_i64(value: &Value, keys: &[&str]) -> Option<i64> {
    let found = pick(value, keys)?;
    found
        .as_i64()
        .or_else(|| found.as_f64().map(|f| f.trunc() as i64))
}

/// Float field under any of `keys`; integers widen losslessly.
#[must_use]
pub fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    pick(value, keys)?.as_f64()
}

/// Boolean field under any of `keys`; missing reads as `false`.
#[must_use]
pub fn pick_bool(value: &Value, keys: &[&str]) -> bool {
    pick(value, keys).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde_json::json;

    use super::{pick, pick_bool, pick_f64, pick_i64, pick_str};

    #[test]
    fn first_present_key_wins() {
        let record = json!({"JobID": "j-pascal", "job_id": "j-snake"});
        assert_eq!(
            pick_str(&record, &["JobID", "job_id"]).as_deref(),
            Some("j-pascal")
        );
    }

    #[test]
    fn falls_back_to_later_keys() {
        let record = json!({"job_id": "j-snake"});
        assert_eq!(
            pick_str(&record, &["JobID", "job_id"]).as_deref(),
            Some("j-snake")
        );
    }

    #[test]
    fn null_counts_as_absent() {
        let record = json!({"JobID": null, "job_id": "j-snake"});
        assert_eq!(
            pick_str(&record, &["JobID", "job_id"]).as_deref(),
            Some("j-snake")
        );
        assert_eq!(pick(&json!({"only": null}), &["only"]), None);
    }

    #[test]
    fn non_object_inputs_yield_nothing() {
        assert_eq!(pick(&json!(null), &["a"]), None);
        assert_eq!(pick(&json!("string"), &["a"]), None);
        assert_eq!(pick(&json!([1, 2]), &["a"]), None);
    }

    #[test]
    fn numeric_extraction_handles_both_number_shapes() {
        let record = json!({"total_tokens": 1234, "success_rate": 0.75, "latency": 250.9});
        assert_eq!(pick_i64(&record, &["total_tokens"]), Some(1234));
        assert_eq!(pick_i64(&record, &["latency"]), Some(250));
        assert_eq!(pick_f64(&record, &["success_rate"]), Some(0.75));
        assert_eq!(pick_f64(&record, &["total_tokens"]), Some(1234.0));
    }

    #[test]
    fn bool_defaults_to_false() {
        let record = json!({"paused": true});
        assert!(pick_bool(&record, &["Paused", "paused"]));
        assert!(!pick_bool(&record, &["DryRun", "dry_run"]));
        assert!(!pick_bool(&json!({"paused": "yes"}), &["paused"]));
    }
}
