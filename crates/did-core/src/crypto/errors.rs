use thiserror::Error;

/// Errors raised by key handling, signing and proof operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("key material has an unexpected length")]
    InvalidKeyLength,
    #[error("seed must be {0} bytes")]
    InvalidSeed(usize),
    #[error("malformed public key")]
    InvalidPublicKey,
    #[error("malformed secret key")]
    InvalidSecretKey,
    #[error("signing key required but absent")]
    MissingSecretKey,
    #[error("signature could not be produced")]
    SignatureError,
    #[error("signature rejected")]
    VerificationError,
    #[error("invalid call: {0}")]
    InvalidCall(String),
    #[error("invalid proof")]
    InvalidProof,
}
