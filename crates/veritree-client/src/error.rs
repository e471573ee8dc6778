//! Error types for veritree-client.

use thiserror::Error;

use crate::submit::SubmissionState;

/// Transport-level failures, classified for the retry loop.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection-level failure (DNS, TLS, socket, request build).
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Unexpected status from the log. Retryable for 5xx.
    #[error("unexpected status {code}: {body}")]
    Status { code: u16, body: String },

    /// The log refused the request outright (malformed, duplicate under a
    /// different signature, quota exceeded). Never retried.
    #[error("log rejected request: {reason}")]
    Rejected { reason: String },

    /// The response body did not decode as the expected wire format.
    #[error("failed to decode log response: {0}")]
    Decode(String),

    /// The configured base URL cannot be extended with an endpoint path.
    #[error("invalid endpoint url: {0}")]
    Url(String),
}

impl TransportError {
    /// Whether the retry loop may try again after backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http(_) => true,
            TransportError::Status { code, .. } => *code >= 500,
            TransportError::Rejected { .. } => false,
            TransportError::Decode(_) => false,
            TransportError::Url(_) => false,
        }
    }
}

/// Submission failures surfaced to the caller.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The log rejected the leaf; resubmitting the same leaf cannot
    /// succeed.
    #[error("submission rejected: {reason}")]
    Rejected { reason: String },

    /// The retry budget (deadline or attempts) ran out. `last_state` is
    /// the furthest state the submission reached, for diagnostics and
    /// caller resumption.
    #[error("submission timed out in state {last_state}")]
    Timeout { last_state: SubmissionState },

    /// A non-retryable transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The retry policy failed validation.
    #[error("invalid retry policy: {0}")]
    InvalidPolicy(String),
}
