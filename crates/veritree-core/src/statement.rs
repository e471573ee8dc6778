//! Signed leaf statements.
//!
//! A leaf statement is the unit a transparency log records: a 32-byte
//! checksum, the submitter's Ed25519 signature over it, and the hash of
//! the submitter's verification key. Signing is deterministic for a given
//! (digest, keypair); no randomness is consumed.

use ed25519_dalek::Signature;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, Error};
use crate::hash::{sha256, DIGEST_LEN};
use crate::keys::{KeyHash, Keypair, VerificationKey};
use crate::merkle;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafStatement {
    #[serde(with = "crate::hash::hex32")]
    pub checksum: [u8; 32],
    #[serde(with = "crate::hash::hexsig")]
    pub signature: Signature,
    pub key_hash: KeyHash,
}

impl LeafStatement {
    /// Sign a 32-byte checksum.
    ///
    /// Fails with [`Error::InvalidDigestLength`] unless `digest` is exactly
    /// [`DIGEST_LEN`] bytes.
    pub fn sign(digest: &[u8], keypair: &Keypair) -> CoreResult<Self> {
        let checksum: [u8; DIGEST_LEN] =
            digest
                .try_into()
                .map_err(|_| Error::InvalidDigestLength {
                    expected: DIGEST_LEN,
                    got: digest.len(),
                })?;
        Ok(Self::sign_checksum(checksum, keypair))
    }

    /// Hash an arbitrary-length message with SHA-256 and sign the result.
    ///
    /// Produces exactly the same statement as `sign(&sha256(msg), keypair)`.
    pub fn sign_message(msg: &[u8], keypair: &Keypair) -> Self {
        Self::sign_checksum(sha256(msg), keypair)
    }

    fn sign_checksum(checksum: [u8; 32], keypair: &Keypair) -> Self {
        let signature = keypair.sign(&signed_message(&checksum));
        Self {
            checksum,
            signature,
            key_hash: keypair.public().key_hash(),
        }
    }

    /// Pure signature check. Returns false on any mismatch; never errors.
    pub fn verify(&self, key: &VerificationKey) -> bool {
        key.verify(&signed_message(&self.checksum), &self.signature)
    }

    /// The Merkle leaf hash the log commits to for this statement:
    /// the RFC 6962 leaf hash over checksum ‖ signature ‖ key_hash.
    pub fn leaf_hash(&self) -> [u8; 32] {
        let mut buf = Vec::with_capacity(32 + 64 + 32);
        buf.extend_from_slice(&self.checksum);
        buf.extend_from_slice(&self.signature.to_bytes());
        buf.extend_from_slice(self.key_hash.as_bytes());
        merkle::leaf_hash(&buf)
    }
}

/// The domain-separated message a leaf statement signs.
fn signed_message(checksum: &[u8; 32]) -> Vec<u8> {
    let label = crate::domain::LEAF_STATEMENT.as_bytes();
    let mut buf = Vec::with_capacity(label.len() + checksum.len());
    buf.extend_from_slice(label);
    buf.extend_from_slice(checksum);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn keypair() -> Keypair {
        Keypair::from_seed(&[42u8; 32])
    }

    #[test]
    fn sign_then_verify() {
        let kp = keypair();
        let stmt = LeafStatement::sign(&[0u8; 32], &kp).unwrap();
        assert!(stmt.verify(&kp.public()));
    }

    #[test]
    fn wrong_digest_length_rejected() {
        let kp = keypair();
        assert_matches!(
            LeafStatement::sign(&[0u8; 31], &kp),
            Err(Error::InvalidDigestLength { expected: 32, got: 31 })
        );
        assert_matches!(
            LeafStatement::sign(&[0u8; 33], &kp),
            Err(Error::InvalidDigestLength { expected: 32, got: 33 })
        );
    }

    #[test]
    fn tampered_checksum_fails_verification() {
        let kp = keypair();
        let mut stmt = LeafStatement::sign(&[0u8; 32], &kp).unwrap();
        stmt.checksum[0] ^= 0x01;
        assert!(!stmt.verify(&kp.public()));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let stmt = LeafStatement::sign(&[0u8; 32], &keypair()).unwrap();
        let other = Keypair::from_seed(&[43u8; 32]);
        assert!(!stmt.verify(&other.public()));
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = keypair();
        let a = LeafStatement::sign(&[0u8; 32], &kp).unwrap();
        let b = LeafStatement::sign(&[0u8; 32], &kp).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn digest_bit_flip_changes_signature() {
        let kp = keypair();
        let zero = LeafStatement::sign(&[0u8; 32], &kp).unwrap();
        let mut digest = [0u8; 32];
        digest[31] ^= 0x01;
        let flipped = LeafStatement::sign(&digest, &kp).unwrap();
        assert_ne!(zero.signature, flipped.signature);
    }

    #[test]
    fn sign_message_equals_sign_of_hash() {
        let kp = keypair();
        let msg = b"the quick brown fox";
        let via_message = LeafStatement::sign_message(msg, &kp);
        let via_hash = LeafStatement::sign(&sha256(msg), &kp).unwrap();
        assert_eq!(via_message, via_hash);
    }

    #[test]
    fn serde_roundtrip() {
        let stmt = LeafStatement::sign(&[7u8; 32], &keypair()).unwrap();
        let json = serde_json::to_string(&stmt).unwrap();
        let back: LeafStatement = serde_json::from_str(&json).unwrap();
        assert_eq!(stmt, back);
    }

    proptest! {
        #[test]
        fn any_digest_roundtrips(digest in proptest::array::uniform32(any::<u8>()),
                                 seed in proptest::array::uniform32(any::<u8>())) {
            let kp = Keypair::from_seed(&seed);
            let stmt = LeafStatement::sign(&digest, &kp).unwrap();
            prop_assert!(stmt.verify(&kp.public()));
            prop_assert_eq!(stmt.key_hash, kp.public().key_hash());
        }
    }
}
