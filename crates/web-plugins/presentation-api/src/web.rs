use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    response::Json,
    routing::post,
    Router,
};
use identity_core::{jwt, query::QueryError, state::HubState};
use serde_json::Value;

use crate::{
    error::PresentationApiError,
    model::{PresentationQueryMessage, PresentationResponseMessage},
};

pub(crate) fn routes(state: Arc<HubState>) -> Router {
    Router::new()
        .route(
            "/api/presentation/v1/participants/:participant_id/presentation/query",
            post(presentation_query),
        )
        .with_state(state)
}

#[axum::debug_handler]
async fn presentation_query(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<PresentationResponseMessage>, PresentationApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
        .ok_or_else(|| {
            PresentationApiError::AuthenticationFailed("Authorization header missing".to_string())
        })?;

    let message: PresentationQueryMessage = serde_json::from_value(body)
        .map_err(|e| PresentationApiError::ValidationFailure(e.to_string()))?;
    message.validate().map_err(PresentationApiError::ValidationFailure)?;

    let granted_scopes = state
        .verifier
        .verify(token, &participant_id)
        .await
        .map_err(|e| {
            PresentationApiError::AuthenticationFailed(format!(
                "ID token verification failed: {e}"
            ))
        })?;

    if message.presentation_definition.is_some() {
        return Err(PresentationApiError::NotImplemented(
            "Querying with a presentationDefinition is not yet supported".to_string(),
        ));
    }

    let credentials = state
        .query_resolver
        .query(&participant_id, &message.scope, &granted_scopes)
        .await
        .map_err(|e| match e {
            QueryError::InvalidScope(msg) => PresentationApiError::ValidationFailure(msg),
            QueryError::Unauthorized(msg) => PresentationApiError::NotAuthorized(msg),
            QueryError::Internal(msg) => PresentationApiError::Internal(msg),
        })?;

    let participant = state
        .participants
        .get(&participant_id)
        .await
        .map_err(|e| PresentationApiError::Internal(e.to_string()))?;

    // The audience of the presentation is the verified token issuer.
    let audience = jwt::decode_unverified(token)
        .ok()
        .and_then(|(_, claims)| claims["iss"].as_str().map(str::to_string));

    let presentations = state
        .presentations
        .create_presentation(&participant, &credentials, audience.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "presentation generation failed");
            PresentationApiError::Internal("error creating presentation".to_string())
        })?;

    Ok(Json(PresentationResponseMessage::new(presentations)))
}
