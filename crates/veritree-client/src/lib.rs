//! veritree-client
//!
//! Asynchronous submission client for a Veritree transparency log:
//! - a transport abstraction over the log's write endpoints
//! - an HTTP transport (JSON over reqwest)
//! - an explicit, caller-tunable retry/backoff policy
//! - the submission state machine: Pending → Queued → Sequenced → Proven
//!
//! The only suspension points are transport calls and backoff sleeps.
//! Submissions share no mutable state; any number may run concurrently
//! over one submitter.

pub mod backoff;
pub mod error;
pub mod http;
pub mod submit;
pub mod transport;

pub use crate::backoff::RetryPolicy;
pub use crate::error::{SubmitError, TransportError};
pub use crate::http::HttpTransport;
pub use crate::submit::{LogSubmitter, SubmissionState};
pub use crate::transport::{AddLeafOutcome, LogTransport};

/// Client version reported in the HTTP user-agent.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
