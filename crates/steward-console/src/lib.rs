//! steward-console: headless state machine for the steward operator console.
//!
//! Consumes the `steward-api` client and owns everything the rendering layer
//! needs: projected status/metrics/run/event views, two-stage run filtering,
//! selection reconciliation, the action executor with its audit trail, and
//! the polling controller.
//!
//! The crate is split into pure modules (projection, filtering, selection,
//! redaction scanning) that are deterministic functions of their inputs, a
//! `ConsoleState` struct holding every mutable slot with reducer-style
//! transitions, and an async `Console` driver that wires state transitions
//! to the remote service.

pub mod actions;
pub mod audit;
pub mod console;
pub mod error;
pub mod events;
pub mod fields;
pub mod filter;
pub mod format;
pub mod poll;
pub mod redaction;
pub mod run_view;
pub mod selection;
pub mod state;
pub mod status_view;

/// Stable crate label used for bootstrap smoke tests.
pub fn crate_label() -> &'static str {
    "steward-console"
}
