//! Self-issued ID token verification for the presentation API.
//!
//! A request token is a JWT whose `iss` and `sub` are the requester's DID,
//! whose `aud` is the participant's DID, and whose `token` claim embeds the
//! access token the participant previously minted for that requester. The
//! outer signature verifies against the requester's DID document, the inner
//! one against the participant's own key pairs.

use std::sync::Arc;

use database::Repository;
use jsonwebtoken::{Algorithm, Validation};
use serde_json::Value;
use thiserror::Error;

use crate::{
    jwt,
    model::ParticipantContext,
    resolver::{DidResolver, ParticipantKeyResolver},
};

#[derive(Debug, Error)]
pub enum TokenVerificationError {
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token not verified: {0}")]
    Signature(String),
    #[error("issuer and subject must be identical")]
    IssuerSubjectMismatch,
    #[error("kid header required")]
    MissingKid,
    #[error("kid must belong to the token issuer")]
    KidIssuerMismatch,
    #[error("unknown participant context: {0}")]
    UnknownParticipant(String),
    #[error("token carries no access token")]
    MissingAccessToken,
    #[error("access token subject binding violated")]
    SubjectMismatch,
}

/// Verifies self-issued ID tokens and extracts the granted scopes.
pub struct SelfIssuedTokenVerifier {
    resolver: DidResolver,
    participant_keys: ParticipantKeyResolver,
    participants: Arc<dyn Repository<ParticipantContext>>,
}

impl SelfIssuedTokenVerifier {
    pub fn new(
        resolver: DidResolver,
        participant_keys: ParticipantKeyResolver,
        participants: Arc<dyn Repository<ParticipantContext>>,
    ) -> Self {
        Self {
            resolver,
            participant_keys,
            participants,
        }
    }

    /// Verifies a self-issued token addressed to the given participant and
    /// returns the scope strings granted by the embedded access token.
    pub async fn verify(
        &self,
        token: &str,
        participant_context_id: &str,
    ) -> Result<Vec<String>, TokenVerificationError> {
        let participant = self
            .participants
            .find_one_by(mongodb::bson::doc! {"participant_context_id": participant_context_id})
            .await
            .map_err(|e| TokenVerificationError::Signature(e.to_string()))?
            .ok_or_else(|| {
                TokenVerificationError::UnknownParticipant(participant_context_id.to_string())
            })?;

        // Routing pass: discover issuer and signing key, nothing trusted yet.
        let (header, claims) =
            jwt::decode_unverified(token).map_err(|e| TokenVerificationError::Malformed(e.to_string()))?;

        let issuer = claims["iss"]
            .as_str()
            .ok_or_else(|| TokenVerificationError::Malformed("iss claim required".to_string()))?;
        let subject = claims["sub"]
            .as_str()
            .ok_or_else(|| TokenVerificationError::Malformed("sub claim required".to_string()))?;
        if issuer != subject {
            return Err(TokenVerificationError::IssuerSubjectMismatch);
        }

        let kid = header.kid.ok_or(TokenVerificationError::MissingKid)?;
        if kid.split('#').next() != Some(issuer) {
            return Err(TokenVerificationError::KidIssuerMismatch);
        }

        // Verifying pass against the issuer's resolved public key.
        let issuer_jwk = self
            .resolver
            .resolve_public_key(&kid)
            .await
            .map_err(|e| TokenVerificationError::Signature(e.to_string()))?;
        let decoding_key = jwt::decoding_key(&issuer_jwk)
            .map_err(|e| TokenVerificationError::Signature(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[&participant.did]);
        validation.set_required_spec_claims(&["exp", "aud"]);

        let outer = jsonwebtoken::decode::<Value>(token, &decoding_key, &validation)
            .map_err(|e| TokenVerificationError::Signature(e.to_string()))?;

        // The embedded access token was minted by the participant itself.
        let access_token = outer.claims["token"]
            .as_str()
            .ok_or(TokenVerificationError::MissingAccessToken)?;

        self.verify_access_token(access_token, participant_context_id, issuer)
            .await
    }

    async fn verify_access_token(
        &self,
        access_token: &str,
        participant_context_id: &str,
        expected_subject: &str,
    ) -> Result<Vec<String>, TokenVerificationError> {
        let (header, _) = jwt::decode_unverified(access_token)
            .map_err(|e| TokenVerificationError::Malformed(e.to_string()))?;
        let kid = header.kid.ok_or(TokenVerificationError::MissingKid)?;

        let signing_jwk = self
            .participant_keys
            .resolve_key(participant_context_id, &kid)
            .await
            .map_err(|e| TokenVerificationError::Signature(e.to_string()))?;
        let decoding_key = jwt::decoding_key(&signing_jwk)
            .map_err(|e| TokenVerificationError::Signature(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = jsonwebtoken::decode::<Value>(access_token, &decoding_key, &validation)
            .map_err(|e| TokenVerificationError::Signature(e.to_string()))?
            .claims;

        if claims["sub"].as_str() != Some(expected_subject) {
            return Err(TokenVerificationError::SubjectMismatch);
        }

        let scopes = claims["scope"]
            .as_str()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(scopes)
    }
}
