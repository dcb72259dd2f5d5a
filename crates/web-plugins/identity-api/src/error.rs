use axum::{
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use identity_core::errors::ServiceError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityApiError {
    #[error("invalid or missing api key")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for IdentityApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound(msg) => IdentityApiError::NotFound(msg),
            ServiceError::Conflict(msg) => IdentityApiError::Conflict(msg),
            ServiceError::BadState(msg) | ServiceError::BadRequest(msg) => {
                IdentityApiError::BadRequest(msg)
            }
            other => IdentityApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for IdentityApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            IdentityApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            IdentityApiError::NotFound(_) => StatusCode::NOT_FOUND,
            IdentityApiError::Conflict(_) => StatusCode::CONFLICT,
            IdentityApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            IdentityApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
