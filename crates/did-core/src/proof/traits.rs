use crate::crypto::Error;

use super::model::Proof;

/// Contract of a Data Integrity cryptosuite.
pub trait CryptoProof {
    /// Produces a proof over the given payload.
    fn proof(&self, payload: serde_json::Value) -> Result<Proof, Error>;

    /// Verifies the proof carried by this instance against the payload.
    fn verify(&self, payload: serde_json::Value) -> Result<(), Error>;
}
