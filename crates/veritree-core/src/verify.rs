//! Offline proof-bundle verification.
//!
//! All checks are pure and deterministic over in-memory structures; this
//! module performs no I/O. Every failure is terminal: re-running the same
//! check cannot succeed without a different bundle.

use std::collections::HashSet;

use crate::errors::VerifyError;
use crate::keys::VerificationKey;
use crate::merkle::root_from_inclusion;
use crate::model::ProofBundle;
use crate::policy::TrustPolicy;

/// Verify a proof bundle against a submitter key and a trust policy.
///
/// Checks, cheapest first:
/// 1. the statement's key hash matches the submitter key
/// 2. the leaf signature verifies under the submitter key
/// 3. the inclusion path recomputes to the signed tree head's root,
///    at the tree head's size
/// 4. the tree head signature verifies under a trusted log key
/// 5. at least `policy.quorum` distinct trusted witnesses cosigned this
///    (tree_size, root_hash)
pub fn verify_bundle(
    bundle: &ProofBundle,
    submitter: &VerificationKey,
    policy: &TrustPolicy,
) -> Result<(), VerifyError> {
    if bundle.statement.key_hash != submitter.key_hash() {
        return Err(VerifyError::KeyMismatch);
    }

    if !bundle.statement.verify(submitter) {
        return Err(VerifyError::BadLeafSignature);
    }

    if bundle.inclusion.tree_size != bundle.tree_head.tree_size {
        return Err(VerifyError::InclusionProofMismatch);
    }
    let root = root_from_inclusion(
        &bundle.statement.leaf_hash(),
        bundle.inclusion.leaf_index,
        bundle.inclusion.tree_size,
        &bundle.inclusion.path,
    )
    .map_err(|_| VerifyError::InclusionProofMismatch)?;
    if root != bundle.tree_head.root_hash {
        return Err(VerifyError::InclusionProofMismatch);
    }

    if !policy.log_keys.iter().any(|key| bundle.tree_head.verify(key)) {
        return Err(VerifyError::UntrustedLog);
    }

    let mut cosigners = HashSet::new();
    for cosig in &bundle.cosignatures {
        if let Some(key) = policy.witness_for(&cosig.witness_key_hash) {
            if cosig.verify(&bundle.tree_head, key) {
                cosigners.insert(cosig.witness_key_hash);
            }
        }
    }
    if cosigners.len() < policy.quorum {
        return Err(VerifyError::InsufficientWitnessQuorum {
            got: cosigners.len(),
            need: policy.quorum,
        });
    }

    Ok(())
}
