use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use identity_core::{
    model::{CreatedParticipantContext, ParticipantContext, ParticipantManifest},
    state::HubState,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{authorize, authorize_superuser};
use crate::error::IdentityApiError;

/// Creating participants is reserved for the superuser, as the created
/// context's own token does not exist yet.
pub(crate) async fn create(
    State(state): State<Arc<HubState>>,
    headers: HeaderMap,
    Json(manifest): Json<ParticipantManifest>,
) -> Result<Json<CreatedParticipantContext>, IdentityApiError> {
    authorize_superuser(&headers)?;

    let created = state.participants.create(&manifest).await?;
    Ok(Json(created))
}

pub(crate) async fn get(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ParticipantContext>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    let context = state.participants.get(&participant_id).await?;
    Ok(Json(context))
}

pub(crate) async fn delete(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    state.participants.delete(&participant_id).await?;
    Ok(Json(json!({})))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StateQuery {
    is_active: bool,
}

pub(crate) async fn set_state(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    Query(query): Query<StateQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    if query.is_active {
        state.participants.activate(&participant_id).await?;
    } else {
        state.participants.deactivate(&participant_id).await?;
    }

    Ok(Json(json!({})))
}

pub(crate) async fn regenerate_token(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    let api_token = state.participants.regenerate_api_token(&participant_id).await?;
    Ok(Json(json!({"api_token": api_token})))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{create_participant, request, setup, SUPERUSER_KEY};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_create_conflicts() {
        let hub = setup();
        create_participant(&hub, "acme").await;

        let (status, _) = request(
            hub.app.clone(),
            Method::POST,
            "/api/identity/v1/participants",
            Some(SUPERUSER_KEY),
            Some(json!({"participant_context_id": "acme"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_state_transitions_via_api() {
        let hub = setup();
        let created = create_participant(&hub, "acme").await;

        let (status, _) = request(
            hub.app.clone(),
            Method::POST,
            "/api/identity/v1/participants/acme/state?isActive=false",
            Some(&created.api_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/acme",
            Some(&created.api_token),
            None,
        )
        .await;
        assert_eq!(body["state"], "Deactivated");

        // Deactivating twice is an invalid transition.
        let (status, _) = request(
            hub.app.clone(),
            Method::POST,
            "/api/identity/v1/participants/acme/state?isActive=false",
            Some(&created.api_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_token_regeneration_invalidates_old_token() {
        let hub = setup();
        let created = create_participant(&hub, "acme").await;

        let (status, body) = request(
            hub.app.clone(),
            Method::POST,
            "/api/identity/v1/participants/acme/token",
            Some(&created.api_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let fresh = body["api_token"].as_str().unwrap().to_string();
        assert_ne!(fresh, created.api_token);

        // The old token no longer authorizes.
        let (status, _) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/acme",
            Some(&created.api_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/acme",
            Some(&fresh),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_delete_then_get_is_404() {
        let hub = setup();
        create_participant(&hub, "acme").await;

        let (status, _) = request(
            hub.app.clone(),
            Method::DELETE,
            "/api/identity/v1/participants/acme",
            Some(SUPERUSER_KEY),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = request(
            hub.app.clone(),
            Method::GET,
            "/api/identity/v1/participants/acme",
            Some(SUPERUSER_KEY),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
