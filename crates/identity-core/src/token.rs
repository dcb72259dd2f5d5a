//! API token minting.
//!
//! A token is `base64(participant id) . base64(64 random bytes)`; the prefix
//! lets the management API locate the owning participant without a scan.

use base64ct::{Base64, Encoding};

use crate::errors::ServiceError;

const TOKEN_RANDOM_BYTES: usize = 64;

/// Separator between the identifying prefix and the random part.
pub const API_TOKEN_SEPARATOR: char = '.';

/// Mints a fresh API token for the given participant.
pub fn generate_api_token(participant_context_id: &str) -> Result<String, ServiceError> {
    let mut random = [0u8; TOKEN_RANDOM_BYTES];
    getrandom::getrandom(&mut random)
        .map_err(|_| ServiceError::BadRequest("rng failure".to_string()))?;

    Ok(format!(
        "{}{}{}",
        Base64::encode_string(participant_context_id.as_bytes()),
        API_TOKEN_SEPARATOR,
        Base64::encode_string(&random),
    ))
}

/// Recovers the participant id a token claims to belong to.
///
/// This is a routing hint only; the caller still has to compare the full
/// token against the stored one.
pub fn participant_id_from_token(token: &str) -> Option<String> {
    let (prefix, _) = token.split_once(API_TOKEN_SEPARATOR)?;
    let decoded = Base64::decode_vec(prefix).ok()?;
    String::from_utf8(decoded).ok()
}
