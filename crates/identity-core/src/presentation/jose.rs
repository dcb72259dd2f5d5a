//! VC DM 2.0 enveloped JOSE presentations.

use jsonwebtoken::{Algorithm, Header};
use serde_json::{json, Value};

use super::{PresentationError, PresentationSigner};
use crate::jwt::encoding_key;

const CONTEXT_CREDENTIALS_V2: &str = "https://www.w3.org/ns/credentials/v2";
const PRESENTATION_VALIDITY_SECS: i64 = 300;

/// Renders credentials into an `EnvelopedVerifiablePresentation`: the
/// presentation itself travels as the payload of a `vp+jwt` data URL.
pub(crate) fn generate(
    signer: &PresentationSigner,
    audience: Option<&str>,
    credentials: Vec<Value>,
) -> Result<Value, PresentationError> {
    let now = chrono::Utc::now().timestamp();

    // Already-enveloped credentials (compact JWS strings) are wrapped as
    // EnvelopedVerifiableCredential references.
    let enclosed: Vec<Value> = credentials
        .into_iter()
        .map(|credential| match credential {
            Value::String(jws) => json!({
                "@context": [CONTEXT_CREDENTIALS_V2],
                "id": format!("data:application/vc+jwt,{jws}"),
                "type": "EnvelopedVerifiableCredential",
            }),
            other => other,
        })
        .collect();

    let mut claims = json!({
        "@context": [CONTEXT_CREDENTIALS_V2],
        "type": ["VerifiablePresentation"],
        "holder": signer.participant_did,
        "verifiableCredential": enclosed,
        "iss": signer.participant_did,
        "iat": now,
        "exp": now + PRESENTATION_VALIDITY_SECS,
    });
    if let Some(audience) = audience {
        claims["aud"] = json!(audience);
    }

    let mut header = Header::new(Algorithm::EdDSA);
    header.kid = Some(signer.key_id.clone());
    header.typ = Some("vp+jwt".to_string());

    let key =
        encoding_key(&signer.private_jwk).map_err(|e| PresentationError::Generation(e.to_string()))?;
    let token = jsonwebtoken::encode(&header, &claims, &key)
        .map_err(|e| PresentationError::Generation(e.to_string()))?;

    Ok(json!({
        "@context": [CONTEXT_CREDENTIALS_V2],
        "id": format!("data:application/vp+jwt,{token}"),
        "type": "EnvelopedVerifiablePresentation",
    }))
}
