//! JWT plumbing shared by presentation generation and token verification.
//!
//! Bridges Ed25519 JWKs into the key types of `jsonwebtoken`.

use base64ct::{Base64UrlUnpadded, Encoding};
use did_core::jwk::Jwk;
use ed25519_dalek::{
    pkcs8::EncodePrivateKey,
    SigningKey,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("unusable key: {0}")]
    UnusableKey(String),
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error(transparent)]
    Codec(#[from] jsonwebtoken::errors::Error),
}

/// Builds a signing key from a private Ed25519 JWK.
pub fn encoding_key(jwk: &Jwk) -> Result<EncodingKey, JwtError> {
    if jwk.key_type != "OKP" || jwk.curve != "Ed25519" {
        return Err(JwtError::UnusableKey(format!(
            "unsupported key type {}/{}",
            jwk.key_type, jwk.curve
        )));
    }

    let d = jwk
        .d
        .as_ref()
        .ok_or_else(|| JwtError::UnusableKey("missing private material".to_string()))?;
    let d: [u8; 32] = Base64UrlUnpadded::decode_vec(d)
        .map_err(|_| JwtError::UnusableKey("undecodable private material".to_string()))?
        .try_into()
        .map_err(|_| JwtError::UnusableKey("private material has wrong length".to_string()))?;

    let document = SigningKey::from_bytes(&d)
        .to_pkcs8_der()
        .map_err(|e| JwtError::UnusableKey(e.to_string()))?;

    Ok(EncodingKey::from_ed_der(document.as_bytes()))
}

/// Builds a verification key from the public half of an Ed25519 JWK.
pub fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, JwtError> {
    if jwk.key_type != "OKP" || jwk.curve != "Ed25519" {
        return Err(JwtError::UnusableKey(format!(
            "unsupported key type {}/{}",
            jwk.key_type, jwk.curve
        )));
    }

    let x = jwk
        .x
        .as_ref()
        .ok_or_else(|| JwtError::UnusableKey("missing public material".to_string()))?;

    Ok(DecodingKey::from_ed_components(x)?)
}

/// Reads a token's header and claims without verifying anything.
///
/// For routing decisions only (kid/iss discovery); every claim read this
/// way must be re-validated by a verifying decode.
pub fn decode_unverified(token: &str) -> Result<(Header, Value), JwtError> {
    let header = jsonwebtoken::decode_header(token)?;

    let mut parts = token.split('.');
    let payload = parts
        .nth(1)
        .ok_or_else(|| JwtError::Malformed("expected three dot-separated segments".to_string()))?;

    let payload = Base64UrlUnpadded::decode_vec(payload)
        .map_err(|_| JwtError::Malformed("undecodable payload segment".to_string()))?;
    let claims =
        serde_json::from_slice(&payload).map_err(|e| JwtError::Malformed(e.to_string()))?;

    Ok((header, claims))
}
