//! veritree-core
//!
//! Core primitives for the Veritree transparency-log client:
//! - Ed25519 keypairs and verification keys
//! - Signed leaf statements over 32-byte checksums
//! - Merkle tree construction and inclusion-proof recomputation
//! - Signed tree heads and witness cosignatures
//! - Trust policies (log keys, witness keys, quorum)
//! - Offline proof-bundle verification
//!
//! This crate performs no I/O and reads no clocks or environment variables.
//! All inputs, including the current time where relevant, are provided
//! explicitly by the caller.

pub mod errors;
pub mod hash;
pub mod keys;
pub mod merkle;
pub mod model;
pub mod policy;
pub mod statement;
pub mod token;
pub mod verify;

pub use crate::errors::{CoreResult, Error, VerifyError};

/// Version string for the v1 statement and proof formats.
pub const FORMAT_VERSION_V1: &str = "v1";

/// Domain separation labels for signed messages.
/// These must remain stable across versions.
pub mod domain {
    pub const LEAF_STATEMENT: &str = "veritree.v1.leaf-statement";
    pub const TREE_HEAD: &str = "veritree.v1.tree-head";
    pub const COSIGNATURE: &str = "veritree.v1.cosignature";
    pub const AUTH_TOKEN: &str = "veritree.v1.auth-token";
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::hash::{sha256, DIGEST_LEN};
    pub use crate::keys::{KeyHash, Keypair, VerificationKey};
    pub use crate::merkle::{root_from_inclusion, MerkleTree};
    pub use crate::model::{Cosignature, InclusionProof, ProofBundle, SignedTreeHead};
    pub use crate::policy::TrustPolicy;
    pub use crate::statement::LeafStatement;
    pub use crate::token::{verify_token, AuthToken, TokenIssuer};
    pub use crate::verify::verify_bundle;
    pub use crate::{CoreResult, Error, VerifyError};
}
