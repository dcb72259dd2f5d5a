use thiserror::Error;

/// Errors surfaced by the participant, key pair and credential services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("illegal state transition: {0}")]
    BadState(String),
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("keystore failure: {0}")]
    Keystore(#[from] keystore::Error),
    #[error("repository failure: {0}")]
    Repository(#[from] database::RepositoryError),
    #[error("crypto failure: {0}")]
    Crypto(#[from] did_core::crypto::Error),
}
