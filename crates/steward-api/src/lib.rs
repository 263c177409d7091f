//! steward-api: Remote API client for the steward job service.
//!
//! Provides a transport-agnostic `StewardApi` trait with implementations for:
//! - `HttpStewardApi`: HTTP/JSON client against the steward REST surface
//! - `MockStewardApi`: Configurable mock for unit testing
//!
//! Status, metrics, run and event payloads are carried as raw
//! `serde_json::Value` so that callers stay tolerant of field-naming drift
//! between service versions; only the response envelopes are typed here.

pub mod error;
pub mod http;
pub mod mock;
pub mod service;
pub mod types;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "steward-api"
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn crate_label_is_stable() {
        assert_eq!(crate_label(), "steward-api");
    }
}
