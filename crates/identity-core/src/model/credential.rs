use database::Identifiable;
use did_core::vc::VerifiableCredential;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A verifiable credential held for a participant.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CredentialResource {
    #[serde(rename = "_id")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub credential_id: String,

    pub participant_context_id: String,

    pub issuer_id: String,

    pub holder_id: String,

    pub state: CredentialState,

    pub verifiable_credential: VerifiableCredentialContainer,

    pub created_at: i64,

    pub last_modified: i64,
}

/// Validity of a stored credential as last determined.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Issued,
    NotYetValid,
    Expired,
    Revoked,
    Suspended,
}

/// Serialization format a credential was received in.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFormat {
    #[serde(rename = "VC1_0_JWT")]
    Vc1Jwt,
    #[serde(rename = "VC1_0_LD")]
    Vc1Ld,
    #[serde(rename = "VC2_0_JOSE")]
    Vc2Jose,
}

/// A credential in both its raw and parsed representation.
///
/// The raw form is what gets enclosed into presentations; the parsed form
/// is what queries and status checks operate on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct VerifiableCredentialContainer {
    pub raw: String,

    pub format: CredentialFormat,

    pub credential: VerifiableCredential,
}

impl Identifiable for CredentialResource {
    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn set_id(&mut self, id: ObjectId) {
        self.id = Some(id);
    }
}

impl VerifiableCredentialContainer {
    /// The raw representation as the JSON value to enclose in a
    /// presentation: a string for JWT/JOSE formats, an object otherwise.
    pub fn raw_as_value(&self) -> serde_json::Value {
        match self.format {
            CredentialFormat::Vc1Jwt | CredentialFormat::Vc2Jose => {
                serde_json::Value::String(self.raw.clone())
            }
            CredentialFormat::Vc1Ld => serde_json::from_str(&self.raw)
                .unwrap_or_else(|_| serde_json::Value::String(self.raw.clone())),
        }
    }
}
