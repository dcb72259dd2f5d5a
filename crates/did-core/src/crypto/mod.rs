//! Cryptographic primitives behind curve-agnostic traits.
//!
//! Consumers program against [`Generate`], [`KeyMaterial`] and [`CoreSign`]
//! so that additional curves can be added without touching call sites.

mod ed25519;
mod errors;
mod traits;

pub use ed25519::Ed25519KeyPair;
pub use errors::Error;
pub use traits::{CoreSign, Generate, KeyMaterial, ToMultikey, BYTES_LENGTH_32};

use sha2::{Digest, Sha256};

/// SHA-256 digest of the given bytes.
pub fn sha256_hash(payload: &[u8]) -> Vec<u8> {
    Sha256::digest(payload).to_vec()
}
