use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use identity_core::{
    model::{KeyDescriptor, KeyPairResource},
    state::HubState,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::authorize;
use crate::error::IdentityApiError;

pub(crate) async fn list(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<KeyPairResource>>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    let pairs = state.key_pairs.list(&participant_id).await?;
    Ok(Json(pairs))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddQuery {
    #[serde(default)]
    make_default: bool,
}

pub(crate) async fn add(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    Query(query): Query<AddQuery>,
    headers: HeaderMap,
    Json(descriptor): Json<KeyDescriptor>,
) -> Result<Json<KeyPairResource>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;

    let participant = state.participants.get(&participant_id).await?;
    let pair = state
        .key_pairs
        .add_key_pair(&participant_id, &participant.did, &descriptor, query.make_default)
        .await?;

    Ok(Json(pair))
}

/// Body of the activate/rotate/revoke operations.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KeyPairOperation {
    key_id: String,

    /// Descriptor of the successor pair, where the operation supports one.
    #[serde(default)]
    successor: Option<KeyDescriptor>,
}

/// Loads the pair and checks it belongs to the addressed participant.
async fn owned_pair(
    state: &HubState,
    participant_id: &str,
    key_id: &str,
) -> Result<KeyPairResource, IdentityApiError> {
    let pair = state.key_pairs.get(key_id).await?;
    if pair.participant_context_id != participant_id {
        return Err(IdentityApiError::NotFound(format!(
            "no key pair {key_id} for participant {participant_id}"
        )));
    }
    Ok(pair)
}

pub(crate) async fn activate(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
    Json(operation): Json<KeyPairOperation>,
) -> Result<Json<Value>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;
    owned_pair(&state, &participant_id, &operation.key_id).await?;

    state.key_pairs.activate(&operation.key_id).await?;
    Ok(Json(json!({})))
}

pub(crate) async fn rotate(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
    Json(operation): Json<KeyPairOperation>,
) -> Result<Json<Value>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;
    owned_pair(&state, &participant_id, &operation.key_id).await?;

    let successor = state
        .key_pairs
        .rotate(&operation.key_id, operation.successor.as_ref())
        .await?;
    Ok(Json(json!({"successor": successor})))
}

pub(crate) async fn revoke(
    State(state): State<Arc<HubState>>,
    Path(participant_id): Path<String>,
    headers: HeaderMap,
    Json(operation): Json<KeyPairOperation>,
) -> Result<Json<Value>, IdentityApiError> {
    authorize(&state, &headers, &participant_id).await?;
    owned_pair(&state, &participant_id, &operation.key_id).await?;

    let successor = state
        .key_pairs
        .revoke(&operation.key_id, operation.successor.as_ref())
        .await?;
    Ok(Json(json!({"successor": successor})))
}
