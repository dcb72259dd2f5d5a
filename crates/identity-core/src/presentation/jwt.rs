//! VC DM 1.1 JWT presentations.

use jsonwebtoken::{Algorithm, Header};
use serde_json::{json, Value};

use super::{PresentationError, PresentationSigner};
use crate::jwt::encoding_key;

const CONTEXT_CREDENTIALS_V1: &str = "https://www.w3.org/2018/credentials/v1";

/// Validity window of a generated presentation token.
const PRESENTATION_VALIDITY_SECS: i64 = 300;

/// Renders credentials into a signed `vp` claim JWT (compact JWS string).
pub(crate) fn generate(
    signer: &PresentationSigner,
    audience: Option<&str>,
    credentials: Vec<Value>,
) -> Result<Value, PresentationError> {
    let now = chrono::Utc::now().timestamp();

    let vp = json!({
        "@context": [CONTEXT_CREDENTIALS_V1],
        "type": ["VerifiablePresentation"],
        "holder": signer.participant_did,
        "verifiableCredential": credentials,
    });

    let mut claims = json!({
        "iss": signer.participant_did,
        "sub": signer.participant_did,
        "jti": format!("urn:uuid:{}", uuid::Uuid::new_v4()),
        "iat": now,
        "nbf": now,
        "exp": now + PRESENTATION_VALIDITY_SECS,
        "vp": vp,
    });
    if let Some(audience) = audience {
        claims["aud"] = json!(audience);
    }

    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(signer.key_id.clone());

    let key =
        encoding_key(&signer.private_jwk).map_err(|e| PresentationError::Generation(e.to_string()))?;
    let token = jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| PresentationError::Generation(e.to_string()))?;

    Ok(Value::String(token))
}
