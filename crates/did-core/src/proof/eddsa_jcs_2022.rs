use multibase::Base;

use super::{model::Proof, traits::CryptoProof};
use crate::crypto::{sha256_hash, CoreSign, Ed25519KeyPair, Error};

pub const CRYPTOSUITE_EDDSA_JCS_2022: &str = "eddsa-jcs-2022";
pub const PROOF_TYPE_DATA_INTEGRITY: &str = "DataIntegrityProof";

/// The `eddsa-jcs-2022` Data Integrity cryptosuite.
///
/// Proof options and payload are both JCS-canonicalized, hashed with SHA-256
/// and concatenated (options hash first) to form the signing input.
pub struct EdDsaJcs2022 {
    /// Proof options when creating a proof (no proof value yet); the
    /// complete proof as found in the secured document when verifying.
    pub proof: Proof,

    /// Key pair carrying the signing key (proof creation) or only the
    /// public key (verification). Resolution of the verification method
    /// happens before this type is involved.
    pub key_pair: Ed25519KeyPair,

    /// Codec for the produced proof value. Inferred from the multibase
    /// string when verifying, hence optional there.
    pub proof_value_codec: Option<Base>,
}

impl CryptoProof for EdDsaJcs2022 {
    fn proof(&self, payload: serde_json::Value) -> Result<Proof, Error> {
        let codec = self.proof_value_codec.ok_or_else(|| {
            Error::InvalidCall("proof_value_codec must be set for proof creation".to_string())
        })?;

        let normalized_proof = Proof {
            proof_type: PROOF_TYPE_DATA_INTEGRITY.to_string(),
            cryptosuite: Some(CRYPTOSUITE_EDDSA_JCS_2022.to_string()),
            created: self.proof.created.or_else(|| Some(chrono::Utc::now())),
            proof_value: None,
            ..self.proof.clone()
        };

        let hash = signing_input(&normalized_proof, &payload)?;

        self.key_pair.sign(&hash).map(|signature| Proof {
            proof_value: Some(multibase::encode(codec, signature)),
            ..normalized_proof
        })
    }

    fn verify(&self, payload: serde_json::Value) -> Result<(), Error> {
        let proof_value = self.proof.proof_value.as_ref().ok_or(Error::InvalidProof)?;

        let normalized_proof = Proof {
            proof_value: None,
            proof_type: PROOF_TYPE_DATA_INTEGRITY.to_string(),
            cryptosuite: Some(CRYPTOSUITE_EDDSA_JCS_2022.to_string()),
            ..self.proof.clone()
        };

        // The payload is hashed without its proof member.
        let naked_payload = match payload {
            serde_json::Value::Object(mut map) => {
                map.remove("proof");
                serde_json::Value::Object(map)
            }
            other => other,
        };

        let hash = signing_input(&normalized_proof, &naked_payload)?;

        let (_, signature) = multibase::decode(proof_value).map_err(|_| Error::InvalidProof)?;
        self.key_pair.verify(&hash, &signature)
    }
}

fn signing_input(proof: &Proof, payload: &serde_json::Value) -> Result<Vec<u8>, Error> {
    let canon_proof = json_canon::to_string(proof).map_err(|_| Error::InvalidProof)?;
    let canon_doc = json_canon::to_string(payload).map_err(|_| Error::InvalidProof)?;

    Ok([
        sha256_hash(canon_proof.as_bytes()),
        sha256_hash(canon_doc.as_bytes()),
    ]
    .concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Generate;
    use crate::proof::model::{Domain, Proofs, UnsecuredDocument};
    use serde_json::{json, Value};

    fn proof_options(verification_method: &str) -> Proof {
        Proof {
            id: None,
            proof_type: PROOF_TYPE_DATA_INTEGRITY.to_string(),
            cryptosuite: Some(CRYPTOSUITE_EDDSA_JCS_2022.to_string()),
            proof_purpose: "assertionMethod".to_string(),
            verification_method: verification_method.to_string(),
            created: Some(chrono::DateTime::parse_from_rfc3339("2024-02-01T08:00:00Z").unwrap().into()),
            expires: None,
            domain: Some(Domain::SingleString("hub.example.com".to_string())),
            challenge: Some("c82f9325-6d3f-4d18-9a25-8b0cf9e26a61".to_string()),
            proof_value: None,
            previous_proof: None,
            nonce: None,
        }
    }

    #[test]
    fn test_create_then_verify_proof() {
        let key_pair = Ed25519KeyPair::new_with_seed(b"Seed phrase of exactly 32 bytes!").unwrap();
        let public_key = key_pair.public_key;

        let payload = json!({
            "id": "did:example:123456789abcdefghi",
            "degree": "Bachelor of Science",
        });

        let prover = EdDsaJcs2022 {
            proof: proof_options("did:example:issuer#key-1"),
            key_pair,
            proof_value_codec: Some(Base::Base58Btc),
        };

        let secured_proof = prover.proof(payload.clone()).unwrap();
        assert!(secured_proof.proof_value.is_some());

        let secured_doc = UnsecuredDocument {
            content: payload,
            proof: Proofs::SingleProof(Box::new(secured_proof.clone())),
        };
        let secured_doc: Value = serde_json::to_value(&secured_doc).unwrap();

        let verifier = EdDsaJcs2022 {
            proof: secured_proof,
            key_pair: Ed25519KeyPair::from_public_key(&public_key.to_bytes()).unwrap(),
            proof_value_codec: None,
        };

        verifier.verify(secured_doc.clone()).unwrap();

        // Any change to the payload must invalidate the proof.
        let mut tampered = secured_doc;
        tampered["degree"] = json!("Doctor of Philosophy");
        assert!(verifier.verify(tampered).is_err());
    }

    #[test]
    fn test_proof_creation_requires_codec() {
        let key_pair = Ed25519KeyPair::new().unwrap();
        let prover = EdDsaJcs2022 {
            proof: proof_options("did:example:issuer#key-1"),
            key_pair,
            proof_value_codec: None,
        };

        assert!(prover.proof(json!({})).is_err());
    }
}
