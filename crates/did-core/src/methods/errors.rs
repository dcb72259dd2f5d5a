use thiserror::Error;

/// Errors raised while generating or resolving DIDs.
#[derive(Debug, Error)]
pub enum DidMethodError {
    #[error("invalid did: {0}")]
    InvalidDid(String),
    #[error("did method not supported: {0}")]
    MethodNotSupported(String),
    #[error("malformed key material")]
    InvalidKeyMaterial,
    #[error("non-success server response: {0}")]
    NonSuccessResponse(u16),
    #[error("transport failure: {0}")]
    TransportFailure(String),
    #[error("unparseable did document: {0}")]
    UnparseableDocument(String),
}

impl From<reqwest::Error> for DidMethodError {
    fn from(err: reqwest::Error) -> Self {
        DidMethodError::TransportFailure(err.to_string())
    }
}
