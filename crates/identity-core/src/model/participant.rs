use database::Identifiable;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::keypair::KeyDescriptor;

/// A participant operated by this hub.
///
/// The API token itself is never persisted here, only the keystore alias
/// it is stored under.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParticipantContext {
    #[serde(rename = "_id")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub participant_context_id: String,

    pub did: String,

    pub state: ParticipantContextState,

    pub api_token_alias: String,

    #[serde(default)]
    pub roles: Vec<String>,

    pub created_at: i64,

    pub last_modified: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantContextState {
    Created,
    Activated,
    Deactivated,
}

impl Identifiable for ParticipantContext {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

/// Request payload for creating a participant context.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ParticipantManifest {
    pub participant_context_id: String,

    /// Explicit DID for the participant. When absent, a did:key DID is
    /// derived from the initial key pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,

    #[serde(default)]
    pub active: bool,

    #[serde(default)]
    pub roles: Vec<String>,

    /// Customization of the initial key pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyDescriptor>,
}

/// Outcome of participant creation, carrying the API token exactly once.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreatedParticipantContext {
    pub participant_context_id: String,
    pub did: String,
    pub api_token: String,
}
