//! Compact JSON Web Key representation.
//!
//! Only the members the hub works with are modeled; anything else a peer
//! sends is rejected by the consuming conversion, not silently dropped.

use serde::{Deserialize, Serialize};

/// A JSON Web Key as defined in RFC 7517.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Jwk {
    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    #[serde(rename = "kty")]
    pub key_type: String,

    #[serde(rename = "crv")]
    pub curve: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
}

impl Jwk {
    /// Whether private key material is present.
    pub fn is_private(&self) -> bool {
        self.d.is_some()
    }

    /// A copy of this key with private material stripped.
    pub fn to_public(&self) -> Jwk {
        Jwk {
            d: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_public_projection_strips_private_material() {
        let jwk: Jwk = serde_json::from_value(json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "Z0GqpN71rMcnAkky6_J6Bfknr8B-TBsekG3qdI0EQX4",
            "d": "fI1u4riKKd99eox08GlThknq-vEJXcKBI28aiUqArLo"
        }))
        .unwrap();

        assert!(jwk.is_private());

        let public = jwk.to_public();
        assert!(!public.is_private());
        assert_eq!(public.x, jwk.x);

        // The private member must not survive serialization either.
        let serialized = serde_json::to_value(&public).unwrap();
        assert!(serialized.get("d").is_none());
    }
}
