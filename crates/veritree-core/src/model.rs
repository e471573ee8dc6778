//! Wire-level models: inclusion proofs, signed tree heads, cosignatures,
//! and the proof bundle handed to verification.
//!
//! Everything serializes as JSON with hashes and signatures in lowercase
//! hex. These are v1 wire formats; do not introduce breaking changes.

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};

use crate::keys::{KeyHash, Keypair, VerificationKey};
use crate::statement::LeafStatement;

/// A Merkle inclusion proof for one leaf, as issued by the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionProof {
    pub tree_size: u64,
    pub leaf_index: u64,
    #[serde(with = "path_hex")]
    pub path: Vec<[u8; 32]>,
}

/// A log's attestation of its current size and root hash.
///
/// A correctly operating log issues heads with monotonically non-decreasing
/// tree sizes; enforcing that across heads is a monitor's job, not this
/// crate's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTreeHead {
    pub tree_size: u64,
    #[serde(with = "crate::hash::hex32")]
    pub root_hash: [u8; 32],
    /// Unix seconds at which the log issued this head.
    pub timestamp: i64,
    #[serde(with = "crate::hash::hexsig")]
    pub signature: Signature,
}

impl SignedTreeHead {
    /// Sign a tree head. Log-side operation; clients only verify.
    pub fn sign(tree_size: u64, root_hash: [u8; 32], timestamp: i64, keypair: &Keypair) -> Self {
        let signature = keypair.sign(&head_message(tree_size, &root_hash, timestamp));
        Self {
            tree_size,
            root_hash,
            timestamp,
            signature,
        }
    }

    /// Check the log signature against one candidate key.
    pub fn verify(&self, key: &VerificationKey) -> bool {
        key.verify(
            &head_message(self.tree_size, &self.root_hash, self.timestamp),
            &self.signature,
        )
    }
}

/// An independent witness's attestation over a tree head.
///
/// The witness signs only (tree_size, root_hash): quorum counting binds to
/// exactly that pair, regardless of when each witness cosigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cosignature {
    pub witness_key_hash: KeyHash,
    #[serde(with = "crate::hash::hexsig")]
    pub signature: Signature,
}

impl Cosignature {
    pub fn sign(head: &SignedTreeHead, keypair: &Keypair) -> Self {
        let signature = keypair.sign(&cosign_message(head.tree_size, &head.root_hash));
        Self {
            witness_key_hash: keypair.public().key_hash(),
            signature,
        }
    }

    pub fn verify(&self, head: &SignedTreeHead, key: &VerificationKey) -> bool {
        key.verify(
            &cosign_message(head.tree_size, &head.root_hash),
            &self.signature,
        )
    }
}

/// Everything needed to re-verify one logged leaf offline.
///
/// Immutable once assembled; the caller decides persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    pub statement: LeafStatement,
    pub inclusion: InclusionProof,
    pub tree_head: SignedTreeHead,
    pub cosignatures: Vec<Cosignature>,
}

fn head_message(tree_size: u64, root_hash: &[u8; 32], timestamp: i64) -> Vec<u8> {
    let label = crate::domain::TREE_HEAD.as_bytes();
    let mut buf = Vec::with_capacity(label.len() + 8 + 32 + 8);
    buf.extend_from_slice(label);
    buf.extend_from_slice(&tree_size.to_be_bytes());
    buf.extend_from_slice(root_hash);
    buf.extend_from_slice(&timestamp.to_be_bytes());
    buf
}

fn cosign_message(tree_size: u64, root_hash: &[u8; 32]) -> Vec<u8> {
    let label = crate::domain::COSIGNATURE.as_bytes();
    let mut buf = Vec::with_capacity(label.len() + 8 + 32);
    buf.extend_from_slice(label);
    buf.extend_from_slice(&tree_size.to_be_bytes());
    buf.extend_from_slice(root_hash);
    buf
}

/// Serde adapter: audit path as a list of lowercase hex strings.
mod path_hex {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(path: &[[u8; 32]], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(path.len()))?;
        for node in path {
            seq.serialize_element(&hex::encode(node))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<[u8; 32]>, D::Error> {
        let raw = Vec::<String>::deserialize(d)?;
        raw.into_iter()
            .map(|s| {
                let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
                bytes
                    .try_into()
                    .map_err(|_| serde::de::Error::custom("expected 32 hex-encoded bytes"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::LeafStatement;

    fn log_key() -> Keypair {
        Keypair::from_seed(&[5u8; 32])
    }

    #[test]
    fn tree_head_sign_verify() {
        let kp = log_key();
        let head = SignedTreeHead::sign(12, [3u8; 32], 1_700_000_000, &kp);
        assert!(head.verify(&kp.public()));
        assert!(!head.verify(&Keypair::from_seed(&[6u8; 32]).public()));
    }

    #[test]
    fn tampered_head_fails() {
        let kp = log_key();
        let mut head = SignedTreeHead::sign(12, [3u8; 32], 1_700_000_000, &kp);
        head.tree_size += 1;
        assert!(!head.verify(&kp.public()));
    }

    #[test]
    fn cosignature_binds_size_and_root() {
        let log = log_key();
        let witness = Keypair::from_seed(&[8u8; 32]);
        let head = SignedTreeHead::sign(12, [3u8; 32], 1_700_000_000, &log);
        let cosig = Cosignature::sign(&head, &witness);
        assert!(cosig.verify(&head, &witness.public()));

        // Same root at a different size is a different claim.
        let other = SignedTreeHead::sign(13, [3u8; 32], 1_700_000_000, &log);
        assert!(!cosig.verify(&other, &witness.public()));

        // The head timestamp is not part of the cosigned message.
        let reissued = SignedTreeHead::sign(12, [3u8; 32], 1_700_000_500, &log);
        assert!(cosig.verify(&reissued, &witness.public()));
    }

    #[test]
    fn bundle_serde_roundtrip() {
        let log = log_key();
        let submitter = Keypair::from_seed(&[9u8; 32]);
        let statement = LeafStatement::sign(&[1u8; 32], &submitter).unwrap();
        let head = SignedTreeHead::sign(1, statement.leaf_hash(), 1_700_000_000, &log);
        let bundle = ProofBundle {
            statement,
            inclusion: InclusionProof {
                tree_size: 1,
                leaf_index: 0,
                path: vec![],
            },
            tree_head: head.clone(),
            cosignatures: vec![Cosignature::sign(&head, &Keypair::from_seed(&[10u8; 32]))],
        };

        let json = serde_json::to_string(&bundle).unwrap();
        let back: ProofBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(bundle, back);
    }
}
