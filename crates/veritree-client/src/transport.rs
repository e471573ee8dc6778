//! Transport abstraction over a transparency log's write endpoints.

use std::future::Future;

use veritree_core::model::{Cosignature, InclusionProof, SignedTreeHead};
use veritree_core::statement::LeafStatement;
use veritree_core::token::AuthToken;

use crate::error::TransportError;

/// How the log acknowledged an add-leaf request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLeafOutcome {
    /// Receipt acknowledged; the leaf waits in the merge queue.
    Queued,
    /// The leaf is merged and has a tree index; a proof can be fetched.
    Sequenced,
}

/// The log's write surface as seen by the submitter.
///
/// Implementations must tolerate concurrent calls from independent
/// submissions; the submitter never shares state across calls.
pub trait LogTransport {
    /// Submit a leaf. The log is content-addressed on (checksum,
    /// key_hash): re-submitting an already-sequenced leaf reports
    /// `Sequenced` again rather than erroring.
    fn add_leaf(
        &self,
        statement: &LeafStatement,
        token: Option<&AuthToken>,
    ) -> impl Future<Output = Result<AddLeafOutcome, TransportError>> + Send;

    /// Fetch the log's latest signed tree head with its cosignatures.
    fn latest_tree_head(
        &self,
    ) -> impl Future<Output = Result<(SignedTreeHead, Vec<Cosignature>), TransportError>> + Send;

    /// Fetch the inclusion proof for `leaf_hash` in the tree of
    /// `tree_size`, or `None` if the leaf is not provable at that size
    /// yet.
    fn inclusion_proof(
        &self,
        tree_size: u64,
        leaf_hash: &[u8; 32],
    ) -> impl Future<Output = Result<Option<InclusionProof>, TransportError>> + Send;
}
