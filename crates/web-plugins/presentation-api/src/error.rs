use axum::{
    response::{IntoResponse, Response},
    Json,
};
use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Errors of the presentation API, rendered as the DCP error body:
/// an array of `{"type", "message"}` objects.
#[derive(Debug, Error)]
pub enum PresentationApiError {
    #[error("{0}")]
    AuthenticationFailed(String),
    #[error("{0}")]
    ValidationFailure(String),
    #[error("{0}")]
    NotAuthorized(String),
    #[error("{0}")]
    NotImplemented(String),
    #[error("{0}")]
    Internal(String),
}

impl PresentationApiError {
    fn status(&self) -> StatusCode {
        match self {
            PresentationApiError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            PresentationApiError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
            PresentationApiError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            PresentationApiError::NotImplemented(_) => StatusCode::SERVICE_UNAVAILABLE,
            PresentationApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            PresentationApiError::AuthenticationFailed(_) => "AuthenticationFailed",
            PresentationApiError::ValidationFailure(_) => "ValidationFailure",
            PresentationApiError::NotAuthorized(_) => "NotAuthorized",
            PresentationApiError::NotImplemented(_) => "NotImplemented",
            PresentationApiError::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for PresentationApiError {
    fn into_response(self) -> Response {
        let body = Json(json!([{
            "type": self.kind(),
            "message": self.to_string(),
        }]));

        (self.status(), body).into_response()
    }
}
