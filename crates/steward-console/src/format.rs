//! Display formatting helpers shared by the projected views.
//!
//! Absent values always render as the `PLACEHOLDER` dash so the rendering
//! layer never has to special-case missing fields.

use chrono::{DateTime, Utc};

/// Rendered for any field the service did not provide.
pub const PLACEHOLDER: &str = "—";

/// Visual tone a rendering layer can map to its own palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Active,
    Pending,
    Muted,
    Default,
}

/// Group an integer with thousands separators (`1234567` → `"1,234,567"`).
#[must_use]
pub fn fmt_number(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Optional count; absent renders as the placeholder.
#[must_use]
pub fn fmt_opt_number(value: Option<i64>) -> String {
    match value {
        Some(v) => fmt_number(v),
        None => PLACEHOLDER.to_string(),
    }
}

/// Token count with unit suffix.
#[must_use]
pub fn fmt_tokens(value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{} tok", fmt_number(v)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Latency in milliseconds with unit suffix.
#[must_use]
pub fn fmt_ms(value: Option<i64>) -> String {
    match value {
        Some(v) => format!("{} ms", fmt_number(v)),
        None => PLACEHOLDER.to_string(),
    }
}

/// Timestamp display: parsed value formatted in UTC, otherwise the raw
/// service string, otherwise the placeholder.
#[must_use]
pub fn fmt_timestamp(parsed: Option<DateTime<Utc>>, raw: Option<&str>) -> String {
    if let Some(ts) = parsed {
        return ts.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{fmt_ms, fmt_number, fmt_opt_number, fmt_timestamp, fmt_tokens, PLACEHOLDER};

    #[test]
    fn numbers_group_thousands() {
        assert_eq!(fmt_number(0), "0");
        assert_eq!(fmt_number(999), "999");
        assert_eq!(fmt_number(1_000), "1,000");
        assert_eq!(fmt_number(1_234_567), "1,234,567");
        assert_eq!(fmt_number(-45_678), "-45,678");
    }

    #[test]
    fn unit_formats_carry_placeholder_for_absent() {
        assert_eq!(fmt_tokens(Some(1_500)), "1,500 tok");
        assert_eq!(fmt_tokens(None), PLACEHOLDER);
        assert_eq!(fmt_ms(Some(250)), "250 ms");
        assert_eq!(fmt_ms(None), PLACEHOLDER);
        assert_eq!(fmt_opt_number(None), PLACEHOLDER);
    }

    #[test]
    fn timestamp_prefers_parsed_then_raw_then_placeholder() {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        assert_eq!(fmt_timestamp(Some(ts), None), "2025-06-01 12:30:00");
        assert_eq!(fmt_timestamp(None, Some("not-a-date")), "not-a-date");
        assert_eq!(fmt_timestamp(None, Some("   ")), PLACEHOLDER);
        assert_eq!(fmt_timestamp(None, None), PLACEHOLDER);
    }
}
