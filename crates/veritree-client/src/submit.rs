//! The submission state machine.
//!
//! One `submit` call drives a leaf through:
//!
//! ```text
//! Pending → Queued → Sequenced → Proven
//!        ↘        ↘ Failed (rejected)
//! ```
//!
//! The log batches queued leaves and merges them asynchronously, so the
//! add-leaf phase retries with capped exponential backoff until the log
//! reports the leaf sequenced. The proof phase then polls the tree-head
//! and inclusion-proof endpoints until the full bundle can be assembled.
//! The caller's retry policy bounds both phases jointly.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use veritree_core::model::ProofBundle;
use veritree_core::statement::LeafStatement;
use veritree_core::token::AuthToken;

use crate::backoff::RetryPolicy;
use crate::error::{SubmitError, TransportError};
use crate::transport::{AddLeafOutcome, LogTransport};

/// Where a submission currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    /// No acknowledgement from the log yet.
    Pending,
    /// The log acknowledged receipt but has not merged the leaf.
    Queued,
    /// The leaf has a tree index; the proof is not assembled yet.
    Sequenced,
    /// A full proof bundle was obtained.
    Proven,
    /// Terminal failure.
    Failed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubmissionState::Pending => "pending",
            SubmissionState::Queued => "queued",
            SubmissionState::Sequenced => "sequenced",
            SubmissionState::Proven => "proven",
            SubmissionState::Failed => "failed",
        })
    }
}

/// Submits leaf statements to a transparency log and assembles proof
/// bundles.
///
/// Stateless across submissions; share one submitter behind a reference
/// for concurrent use. Each submission owns its backoff timer and
/// deadline, so cancellation (dropping the future) abandons polling
/// without affecting anything already returned. Leaves already queued on
/// the log side are not rolled back; the log is authoritative.
#[derive(Debug, Clone)]
pub struct LogSubmitter<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: LogTransport> LogSubmitter<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Submit one signed leaf and wait for its proof bundle.
    ///
    /// Returns the complete bundle, or:
    /// - [`SubmitError::Rejected`] if the log refused the leaf (terminal),
    /// - [`SubmitError::Timeout`] carrying the furthest state reached if
    ///   the policy's deadline or attempt budget ran out,
    /// - [`SubmitError::Transport`] on a non-retryable transport failure.
    ///
    /// The log is content-addressed on (checksum, key_hash):
    /// re-submitting an already-sequenced leaf returns the existing proof
    /// bundle.
    pub async fn submit(
        &self,
        statement: &LeafStatement,
        token: Option<&AuthToken>,
    ) -> Result<ProofBundle, SubmitError> {
        self.policy.validate()?;

        let submission = Uuid::new_v4();
        let deadline = Instant::now() + self.policy.deadline;
        let leaf_hash = statement.leaf_hash();
        let mut state = SubmissionState::Pending;
        let mut attempt: u32 = 0;

        debug!(%submission, leaf = %hex::encode(leaf_hash), "submitting leaf");

        // Phase 1: get the leaf sequenced.
        loop {
            match self.transport.add_leaf(statement, token).await {
                Ok(AddLeafOutcome::Sequenced) => {
                    state = SubmissionState::Sequenced;
                    debug!(%submission, "leaf sequenced");
                    break;
                }
                Ok(AddLeafOutcome::Queued) => {
                    if state == SubmissionState::Pending {
                        debug!(%submission, "leaf queued for merge");
                    }
                    state = SubmissionState::Queued;
                }
                Err(TransportError::Rejected { reason }) => {
                    debug!(%submission, %reason, "leaf rejected");
                    return Err(SubmitError::Rejected { reason });
                }
                Err(e) if e.is_retryable() => {
                    warn!(%submission, error = %e, "transient add-leaf failure, will retry");
                }
                Err(e) => return Err(SubmitError::Transport(e)),
            }

            self.wait_or_timeout(&mut attempt, deadline, state).await?;
        }

        // Phase 2: assemble the proof bundle.
        loop {
            match self.fetch_bundle(statement, &leaf_hash).await {
                Ok(Some(bundle)) => {
                    debug!(
                        %submission,
                        tree_size = bundle.tree_head.tree_size,
                        leaf_index = bundle.inclusion.leaf_index,
                        "proof bundle assembled"
                    );
                    return Ok(bundle);
                }
                Ok(None) => {
                    debug!(%submission, "proof not yet available");
                }
                Err(e) if e.is_retryable() => {
                    warn!(%submission, error = %e, "transient proof fetch failure, will retry");
                }
                Err(e) => return Err(SubmitError::Transport(e)),
            }

            self.wait_or_timeout(&mut attempt, deadline, state).await?;
        }
    }

    /// One tree-head plus inclusion-proof round. `None` until the leaf is
    /// provable at the latest head.
    async fn fetch_bundle(
        &self,
        statement: &LeafStatement,
        leaf_hash: &[u8; 32],
    ) -> Result<Option<ProofBundle>, TransportError> {
        let (tree_head, cosignatures) = self.transport.latest_tree_head().await?;
        let Some(inclusion) = self
            .transport
            .inclusion_proof(tree_head.tree_size, leaf_hash)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(ProofBundle {
            statement: statement.clone(),
            inclusion,
            tree_head,
            cosignatures,
        }))
    }

    /// Sleep for the next backoff step, or fail with `Timeout` when the
    /// attempt budget or deadline would be exceeded. Never oversleeps the
    /// deadline.
    async fn wait_or_timeout(
        &self,
        attempt: &mut u32,
        deadline: Instant,
        state: SubmissionState,
    ) -> Result<(), SubmitError> {
        let delay = self.policy.delay_for(*attempt);
        *attempt += 1;
        if *attempt >= self.policy.max_attempts || Instant::now() + delay > deadline {
            return Err(SubmitError::Timeout { last_state: state });
        }
        sleep(delay).await;
        Ok(())
    }
}
