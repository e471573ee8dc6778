//! Ed25519 key material.
//!
//! Keypairs come from the OS entropy source or from an explicit 32-byte
//! seed. The serialized form is seed ‖ public key (64 bytes); the public
//! half is cross-checked against the seed on load, so corrupted or
//! mixed-up key material is rejected instead of silently signing under a
//! different identity.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, Error};
use crate::hash::sha256;

/// Length of a serialized keypair (seed ‖ public key).
pub const KEYPAIR_LEN: usize = 64;

/// Length of a serialized verification key.
pub const VERIFICATION_KEY_LEN: usize = 32;

/// An Ed25519 signing keypair.
///
/// Owns the secret. The secret leaves this type only through
/// [`Keypair::to_bytes`].
#[derive(Clone)]
pub struct Keypair {
    signing: SigningKey,
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public", &self.public().to_hex())
            .finish_non_exhaustive()
    }
}

impl Keypair {
    /// Generate a fresh keypair from the OS entropy source.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic construction from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing: SigningKey::from_bytes(seed),
        }
    }

    /// Derive the verification key. Pure; cannot fail.
    pub fn public(&self) -> VerificationKey {
        VerificationKey(self.signing.verifying_key())
    }

    /// Serialize as seed ‖ public key.
    pub fn to_bytes(&self) -> [u8; KEYPAIR_LEN] {
        let mut out = [0u8; KEYPAIR_LEN];
        out[..32].copy_from_slice(&self.signing.to_bytes());
        out[32..].copy_from_slice(self.signing.verifying_key().as_bytes());
        out
    }

    /// Deserialize a keypair produced by [`Keypair::to_bytes`].
    ///
    /// Fails with [`Error::MalformedKey`] on wrong length or when the
    /// stored public key does not match the one derived from the seed.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != KEYPAIR_LEN {
            return Err(Error::malformed_key(format!(
                "expected {KEYPAIR_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&bytes[..32]);
        let signing = SigningKey::from_bytes(&seed);
        if signing.verifying_key().as_bytes() != &bytes[32..] {
            return Err(Error::malformed_key("public key does not match the seed"));
        }
        Ok(Self { signing })
    }

    pub(crate) fn sign(&self, message: &[u8]) -> Signature {
        self.signing.sign(message)
    }
}

/// An Ed25519 verification (public) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerificationKey(VerifyingKey);

impl VerificationKey {
    /// Fails with [`Error::MalformedKey`] on wrong length or an encoding
    /// that is not a valid curve point.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let arr: [u8; VERIFICATION_KEY_LEN] = bytes.try_into().map_err(|_| {
            Error::malformed_key(format!(
                "expected {VERIFICATION_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        let key = VerifyingKey::from_bytes(&arr)
            .map_err(|e| Error::malformed_key(format!("invalid curve point: {e}")))?;
        Ok(Self(key))
    }

    /// Parse from a hex string, as trust policy files carry keys.
    pub fn from_hex(raw: &str) -> CoreResult<Self> {
        let bytes =
            hex::decode(raw).map_err(|e| Error::malformed_key(format!("invalid hex: {e}")))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; VERIFICATION_KEY_LEN] {
        self.0.to_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// SHA-256 over the raw public key bytes. Logs and trust policies
    /// refer to keys by this hash.
    pub fn key_hash(&self) -> KeyHash {
        KeyHash(sha256(&self.to_bytes()))
    }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.0.verify(message, signature).is_ok()
    }
}

/// SHA-256 of a verification key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyHash(#[serde(with = "crate::hash::hex32")] pub [u8; 32]);

impl KeyHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for KeyHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyHash({})", self.to_hex())
    }
}

impl std::fmt::Display for KeyHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
