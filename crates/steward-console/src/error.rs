//! Console error taxonomy.

use steward_api::error::ApiError;

/// Errors surfaced by the console driver and its state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsoleError {
    /// Another action is still running; exactly one may be in flight.
    #[error("another action is still running")]
    ActionInFlight,

    /// Confirm was answered with no pending confirmation.
    #[error("no action awaiting confirmation")]
    NothingPending,

    /// The action does not apply to the target run's current status.
    #[error("{action} is not available for a {status} run")]
    NotEligible { action: String, status: String },

    /// The action names a job absent from the current page.
    #[error("job {0} is not in the current page")]
    UnknownJob(String),

    /// Mode actions need a loaded status snapshot to compute the target.
    #[error("worker status has not loaded yet")]
    StatusUnavailable,

    /// A remote call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
