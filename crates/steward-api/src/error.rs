//! Normalized error types for steward API operations.
//!
//! Transport-agnostic errors that hide HTTP client details and provide
//! actionable error categories for callers.

/// Normalized error for steward API operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The service is unreachable, or the request timed out before a
    /// response arrived.
    #[error("steward service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-success status. `message` carries the
    /// service's own error text when the body had one.
    #[error("steward service returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response arrived but was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Request rejected before any I/O (empty job id, bad paging values).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ApiError {
    /// Whether this error is retryable (transport failures, server faults).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::InvalidArgument(_) => false,
        }
    }
}
