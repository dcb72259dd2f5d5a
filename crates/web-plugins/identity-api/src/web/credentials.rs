use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use database::Repository;
use did_core::vc::VerifiableCredential;
use identity_core::{
    events::HubEvent,
    model::{CredentialFormat, CredentialResource, CredentialState, VerifiableCredentialContainer},
    state::HubState,
};
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::authorize;
use crate::error::IdentityApiError;

/// Upsert request for a stored credential.
#[derive(Debug, Deserialize)]
pub(crate) struct CredentialWriteRequest {
    credential_id: String,
    format: CredentialFormat,
    /// Raw representation: compact JWS for JWT/JOSE formats, JSON text
    /// otherwise.
    raw: String,
    /// Parsed credential. Derived from `raw` for linked-data credentials
    /// when absent.
    credential: Option<VerifiableCredential>,
}

pub(crate) async fn list(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<CredentialResource>>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    let resources = state
        .credentials
        .find_all_by(doc! {"participant_context_id": &participant_id}, None)
        .await
        .map_err(|e| IdentityApiError::Internal(e.to_string()))?;

    Ok(Json(resources))
}

pub(crate) async fn get(
    State(state): State<Arc<HubState>>,
    Path((participant_id, credential_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<CredentialResource>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    find(&state, &participant_id, &credential_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            IdentityApiError::NotFound(format!("no credential {credential_id}"))
        })
}

pub(crate) async fn upsert(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<CredentialWriteRequest>,
) -> Result<Json<CredentialResource>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    let credential = match request.credential {
        Some(credential) => credential,
        None if request.format == CredentialFormat::Vc1Ld => {
            serde_json::from_str(&request.raw)
                .map_err(|e| IdentityApiError::BadRequest(e.to_string()))?
        }
        None => {
            return Err(IdentityApiError::BadRequest(
                "enveloped credentials must include the parsed credential".to_string(),
            ))
        }
    };

    let holder_id = credential
        .credential_subject
        .iter()
        .next()
        .and_then(|subject| subject.id.clone())
        .unwrap_or_else(|| participant_id.clone());

    let now = chrono::Utc::now().timestamp_millis();
    let resource = CredentialResource {
        id: None,
        credential_id: request.credential_id.clone(),
        participant_context_id: participant_id.clone(),
        issuer_id: credential.issuer.id().to_string(),
        holder_id,
        state: CredentialState::Issued,
        verifiable_credential: VerifiableCredentialContainer {
            raw: request.raw,
            format: request.format,
            credential,
        },
        created_at: now,
        last_modified: now,
    };

    let stored = match find(&state, &participant_id, &request.credential_id).await? {
        Some(existing) => {
            let resource = CredentialResource {
                id: existing.id,
                created_at: existing.created_at,
                ..resource
            };
            state
                .credentials
                .update(resource)
                .await
                .map_err(|e| IdentityApiError::Internal(e.to_string()))?
        }
        None => state
            .credentials
            .store(resource)
            .await
            .map_err(|e| IdentityApiError::Internal(e.to_string()))?,
    };

    state.events.publish(HubEvent::CredentialStored {
        participant_context_id: participant_id,
        credential_id: request.credential_id,
    });

    Ok(Json(stored))
}

pub(crate) async fn delete(
    State(state): State<Arc<HubState>>,
    Path((participant_id, credential_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    let resource = find(&state, &participant_id, &credential_id)
        .await?
        .ok_or_else(|| {
            IdentityApiError::NotFound(format!("no credential {credential_id}"))
        })?;

    if let Some(id) = resource.id {
        state
            .credentials
            .delete_one(id)
            .await
            .map_err(|e| IdentityApiError::Internal(e.to_string()))?;
    }

    state.events.publish(HubEvent::CredentialDeleted {
        participant_context_id: participant_id,
        credential_id,
    });

    Ok(Json(json!({})))
}

async fn find(
    state: &HubState,
    participant_id: &str,
    credential_id: &str,
) -> Result<Option<CredentialResource>, IdentityApiError> {
    state
        .credentials
        .find_one_by(doc! {
            "participant_context_id": participant_id,
            "credential_id": credential_id,
        })
        .await
        .map_err(|e| IdentityApiError::Internal(e.to_string()))
}
