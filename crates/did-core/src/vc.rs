//! Verifiable credential and presentation models.
//!
//! Shapes follow the VC Data Model 2.0 while staying deserializable from
//! 1.1 documents (`issuanceDate`/`expirationDate` aliases).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{document::Context, proof::Proofs};

/// A single value or a set of values, serialized without a wrapper.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(Box<T>),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> Box<dyn Iterator<Item = &T> + Send + '_>
    where
        T: Sync,
    {
        match self {
            OneOrMany::One(item) => Box::new(std::iter::once(item.as_ref())),
            OneOrMany::Many(items) => Box::new(items.iter()),
        }
    }
}

/// Represents a Verifiable Credential.
///
/// See <https://www.w3.org/TR/vc-data-model-2.0/>
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context")]
    pub context: Context,

    /// Identifier of this credential, not of its subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub cred_type: Vec<String>,

    pub issuer: Issuer,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(alias = "issuanceDate")]
    pub valid_from: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(alias = "expirationDate")]
    pub valid_until: Option<DateTime<Utc>>,

    pub credential_subject: OneOrMany<CredentialSubject>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_status: Option<OneOrMany<CredentialStatus>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,

    // Absent on the unsecured form handled before proof production
    // or after envelope extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proofs>,
}

/// The issuer of a credential, as a bare DID or an expanded object.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    String(String),
    Object {
        id: String,
        #[serde(flatten)]
        additional_properties: Option<HashMap<String, Value>>,
    },
}

impl Issuer {
    pub fn id(&self) -> &str {
        match self {
            Issuer::String(id) => id,
            Issuer::Object { id, .. } => id,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSubject {
    /// The subject the claims are about, usually a DID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

/// A credential status entry pointing into a status list.
///
/// See <https://www.w3.org/TR/vc-bitstring-status-list/>
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub status_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_purpose: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_index: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_credential: Option<String>,
}

/// Represents a Verifiable Presentation.
///
/// Enclosed credentials stay in their raw representation: JSON objects for
/// linked-data credentials, JWS compact strings for JWT credentials.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context")]
    pub context: Context,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub pres_type: Vec<String>,

    /// Identifies the presenter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,

    pub verifiable_credential: Vec<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proofs>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_credential_with_status() {
        let vc: VerifiableCredential = serde_json::from_value(json!({
            "@context": ["https://www.w3.org/ns/credentials/v2"],
            "id": "http://issuer.example/credentials/3732",
            "type": ["VerifiableCredential", "MembershipCredential"],
            "issuer": "did:web:issuer.example",
            "validFrom": "2024-01-01T00:00:00Z",
            "credentialSubject": {
                "id": "did:web:holder.example",
                "membershipLevel": "gold"
            },
            "credentialStatus": {
                "id": "https://issuer.example/status/1#42",
                "type": "BitstringStatusListEntry",
                "statusPurpose": "revocation",
                "statusListIndex": "42",
                "statusListCredential": "https://issuer.example/status/1"
            }
        }))
        .unwrap();

        assert_eq!(vc.issuer.id(), "did:web:issuer.example");
        assert_eq!(
            vc.cred_type,
            vec!["VerifiableCredential", "MembershipCredential"]
        );

        let status = vc.credential_status.as_ref().unwrap();
        let entry = status.iter().next().unwrap();
        assert_eq!(entry.status_purpose.as_deref(), Some("revocation"));
        assert_eq!(entry.status_list_index.as_deref(), Some("42"));
    }

    #[test]
    fn test_parse_legacy_date_aliases() {
        let vc: VerifiableCredential = serde_json::from_value(json!({
            "@context": "https://www.w3.org/2018/credentials/v1",
            "type": ["VerifiableCredential"],
            "issuer": {"id": "did:web:issuer.example", "name": "Issuer Corp"},
            "issuanceDate": "2023-06-01T00:00:00Z",
            "expirationDate": "2033-06-01T00:00:00Z",
            "credentialSubject": [{"id": "did:web:holder.example"}]
        }))
        .unwrap();

        assert!(vc.valid_from.is_some());
        assert!(vc.valid_until.is_some());
        assert_eq!(vc.issuer.id(), "did:web:issuer.example");
    }

    #[test]
    fn test_presentation_canonical_shape() {
        let vp = VerifiablePresentation {
            context: Context::SetOfString(vec![
                "https://www.w3.org/ns/credentials/v2".to_string()
            ]),
            id: Some("urn:uuid:7b2f7f1a-3c1d-4f8b-9e2a-d9c87b6e2f01".to_string()),
            pres_type: vec!["VerifiablePresentation".to_string()],
            holder: Some("did:web:holder.example".to_string()),
            verifiable_credential: vec![json!("eyJhbGciOiJFZERTQSJ9.e30.sig")],
            proof: None,
        };

        let serialized = serde_json::to_value(&vp).unwrap();
        assert_eq!(serialized["type"][0], "VerifiablePresentation");
        assert!(serialized["verifiableCredential"][0].is_string());
        assert!(serialized.get("proof").is_none());
    }
}
