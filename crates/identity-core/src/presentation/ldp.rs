//! Linked-data presentations secured with `eddsa-jcs-2022`.

use did_core::{
    crypto::Ed25519KeyPair,
    proof::{CryptoProof, EdDsaJcs2022, Proof, CRYPTOSUITE_EDDSA_JCS_2022, PROOF_TYPE_DATA_INTEGRITY},
};
use multibase::Base;
use serde_json::{json, Value};

use super::{PresentationError, PresentationSigner};

const CONTEXT_CREDENTIALS_V2: &str = "https://www.w3.org/ns/credentials/v2";

/// Renders credentials into a linked-data presentation carrying a
/// Data Integrity proof.
pub(crate) fn generate(
    signer: &PresentationSigner,
    credentials: Vec<Value>,
) -> Result<Value, PresentationError> {
    let mut presentation = json!({
        "@context": [CONTEXT_CREDENTIALS_V2],
        "id": format!("urn:uuid:{}", uuid::Uuid::new_v4()),
        "type": ["VerifiablePresentation"],
        "holder": signer.participant_did,
        "verifiableCredential": credentials,
    });

    let key_pair = Ed25519KeyPair::try_from(&signer.private_jwk)
        .map_err(|e| PresentationError::Generation(e.to_string()))?;

    let options = Proof {
        id: None,
        proof_type: PROOF_TYPE_DATA_INTEGRITY.to_string(),
        cryptosuite: Some(CRYPTOSUITE_EDDSA_JCS_2022.to_string()),
        proof_purpose: "assertionMethod".to_string(),
        verification_method: signer.key_id.clone(),
        created: None,
        expires: None,
        domain: None,
        challenge: None,
        proof_value: None,
        previous_proof: None,
        nonce: Some(uuid::Uuid::new_v4().to_string()),
    };

    let prover = EdDsaJcs2022 {
        proof: options,
        key_pair,
        proof_value_codec: Some(Base::Base58Btc),
    };

    let proof = prover
        .proof(presentation.clone())
        .map_err(|e| PresentationError::Generation(e.to_string()))?;

    presentation["proof"] =
        serde_json::to_value(proof).map_err(|e| PresentationError::Generation(e.to_string()))?;

    Ok(presentation)
}
