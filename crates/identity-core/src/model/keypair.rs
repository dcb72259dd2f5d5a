use database::Identifiable;
use did_core::jwk::Jwk;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A key pair owned by a participant.
///
/// Only the public half lives on the resource; the private half stays in
/// the keystore under `private_key_alias` until rotation or revocation
/// destroys it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KeyPairResource {
    #[serde(rename = "_id")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// DID URL of the verification method this pair backs.
    pub key_id: String,

    pub participant_context_id: String,

    pub state: KeyPairState,

    pub usage: String,

    /// Public half as serialized JWK.
    pub serialized_public_key: String,

    pub private_key_alias: String,

    pub is_default_pair: bool,

    pub created_at: i64,

    pub last_modified: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum KeyPairState {
    Created,
    Activated,
    Rotated,
    Revoked,
}

impl Identifiable for KeyPairResource {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

impl KeyPairResource {
    /// Parses the stored public JWK.
    pub fn public_jwk(&self) -> Result<Jwk, serde_json::Error> {
        serde_json::from_str(&self.serialized_public_key)
    }
}

/// Customization of a key pair to be added.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct KeyDescriptor {
    /// DID URL of the verification method. Derived from the participant's
    /// DID and a running key index when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Keystore alias for the private half. Derived when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key_alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Whether the pair starts out activated.
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Default for KeyDescriptor {
    fn default() -> Self {
        Self {
            key_id: None,
            private_key_alias: None,
            usage: None,
            active: true,
        }
    }
}
