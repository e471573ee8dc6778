//! Error types for veritree-core.

use thiserror::Error;

pub type CoreResult<T> = Result<T, Error>;

/// Construction and parsing failures.
#[derive(Debug, Error)]
pub enum Error {
    /// Key material had the wrong length or is not a valid curve point.
    #[error("malformed key: {0}")]
    MalformedKey(String),

    /// A digest had a length other than [`crate::hash::DIGEST_LEN`].
    #[error("invalid digest length: expected {expected} bytes, got {got}")]
    InvalidDigestLength { expected: usize, got: usize },

    /// An inclusion proof is structurally impossible for the claimed tree.
    #[error("invalid inclusion proof: {0}")]
    InvalidProof(String),

    /// An auth token header could not be decoded.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A trust policy line could not be parsed.
    #[error("policy parse error on line {line}: {reason}")]
    ParsePolicy { line: usize, reason: String },

    /// A trust policy is structurally invalid.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),
}

impl Error {
    pub fn malformed_key(msg: impl Into<String>) -> Self {
        Error::MalformedKey(msg.into())
    }

    pub fn invalid_proof(msg: impl Into<String>) -> Self {
        Error::InvalidProof(msg.into())
    }

    pub fn malformed_token(msg: impl Into<String>) -> Self {
        Error::MalformedToken(msg.into())
    }

    pub fn invalid_policy(msg: impl Into<String>) -> Self {
        Error::InvalidPolicy(msg.into())
    }

    pub(crate) fn parse_policy(line: usize, reason: impl Into<String>) -> Self {
        Error::ParsePolicy {
            line,
            reason: reason.into(),
        }
    }
}

/// Verification failures.
///
/// All of these are terminal: re-running verification on the same bundle
/// cannot succeed. A retry requires a different bundle.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    #[error("statement key hash does not match the submitter verification key")]
    KeyMismatch,

    #[error("leaf statement signature does not verify")]
    BadLeafSignature,

    #[error("inclusion proof does not recompute to the signed tree head root")]
    InclusionProofMismatch,

    #[error("tree head signature does not verify against any trusted log key")]
    UntrustedLog,

    #[error("witness quorum not met: {got} valid cosignatures, need {need}")]
    InsufficientWitnessQuorum { got: usize, need: usize },
}
