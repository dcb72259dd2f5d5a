//! W3C DID core document model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{jwk::Jwk, proof::Proofs};

/// The `@context` member of a JSON-LD document.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Context {
    SingleString(String),
    SetOfString(Vec<String>),
}

/// A DID document.
///
/// See <https://www.w3.org/TR/did-core/#core-properties>
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(rename = "@context")]
    pub context: Context,

    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller: Option<Controller>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub also_known_as: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<Vec<VerificationMethod>>,

    // === Verification relationships ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Vec<MethodRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_method: Option<Vec<MethodRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<MethodRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_invocation: Option<Vec<MethodRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_agreement: Option<Vec<MethodRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Vec<Service>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proofs>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Controller {
    SingleString(String),
    SetOfString(Vec<String>),
}

/// A verification method either embedded in a relationship or referenced by id.
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MethodRef {
    Reference(String),
    Embedded(Box<VerificationMethod>),
}

/// See <https://www.w3.org/TR/did-core/#services>
#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,

    #[serde(rename = "type")]
    pub service_type: String,

    pub service_endpoint: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub key_type: String,

    pub controller: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Jwk>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_multibase: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_base58: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub additional_properties: Option<HashMap<String, Value>>,
}

/// Key material in one of the formats a DID document may carry.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFormat {
    Jwk(Box<Jwk>),
    Multibase(String),
    Base58(String),
}

impl VerificationMethod {
    /// The method's public key, preferring JWK over encoded formats.
    pub fn public_key(&self) -> Option<KeyFormat> {
        if let Some(jwk) = &self.public_key_jwk {
            return Some(KeyFormat::Jwk(Box::new(jwk.clone())));
        }
        if let Some(multibase) = &self.public_key_multibase {
            return Some(KeyFormat::Multibase(multibase.clone()));
        }
        self.public_key_base58
            .as_ref()
            .map(|base58| KeyFormat::Base58(base58.clone()))
    }
}

impl Document {
    /// Looks up a verification method by its id.
    ///
    /// Relative ids (`#key-1`) and absolute DID URLs both match.
    pub fn find_verification_method(&self, method_id: &str) -> Option<&VerificationMethod> {
        let fragment = method_id.rfind('#').map(|i| &method_id[i..]);

        self.verification_method.as_ref()?.iter().find(|vm| {
            if vm.id == method_id {
                return true;
            }
            match (fragment, vm.id.rfind('#').map(|i| &vm.id[i..])) {
                (Some(wanted), Some(found)) => wanted == found,
                _ => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Document {
        serde_json::from_value(json!({
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": "did:web:hub.example.com",
            "verificationMethod": [{
                "id": "did:web:hub.example.com#key-1",
                "type": "JsonWebKey2020",
                "controller": "did:web:hub.example.com",
                "publicKeyJwk": {
                    "kty": "OKP",
                    "crv": "Ed25519",
                    "x": "Z0GqpN71rMcnAkky6_J6Bfknr8B-TBsekG3qdI0EQX4"
                }
            }],
            "authentication": ["did:web:hub.example.com#key-1"],
            "assertionMethod": ["did:web:hub.example.com#key-1"]
        }))
        .unwrap()
    }

    #[test]
    fn test_find_verification_method_by_absolute_and_relative_id() {
        let document = sample_document();

        assert!(document
            .find_verification_method("did:web:hub.example.com#key-1")
            .is_some());
        assert!(document.find_verification_method("#key-1").is_some());
        assert!(document.find_verification_method("#key-2").is_none());
    }

    #[test]
    fn test_public_key_dereferencing() {
        let document = sample_document();
        let method = document.find_verification_method("#key-1").unwrap();

        let Some(KeyFormat::Jwk(jwk)) = method.public_key() else {
            panic!("expected a JWK public key");
        };
        assert_eq!(jwk.curve, "Ed25519");

        // Serialization keeps the key under its canonical member name.
        let serialized = serde_json::to_value(&document).unwrap();
        let method = &serialized["verificationMethod"][0];
        assert_eq!(method["publicKeyJwk"]["crv"], "Ed25519");
        assert!(method.get("publicKeyMultibase").is_none());
    }
}
