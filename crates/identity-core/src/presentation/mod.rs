//! Verifiable presentation generation.
//!
//! Queried credentials are grouped by their stored format and each group is
//! rendered by the matching generator: a VC DM 1.1 JWT presentation, a
//! linked-data presentation secured with `eddsa-jcs-2022`, or a VC DM 2.0
//! enveloped JOSE presentation.

mod jose;
mod jwt;
mod ldp;

use std::sync::Arc;

use did_core::jwk::Jwk;
use keystore::Keystore;
use serde_json::Value;
use thiserror::Error;

use crate::{
    errors::ServiceError,
    keypairs::KeyPairService,
    model::{CredentialFormat, CredentialResource, ParticipantContext},
};

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("no signing key available: {0}")]
    NoSigningKey(String),
    #[error("presentation generation failed: {0}")]
    Generation(String),
}

/// Resolved signing material for one participant.
#[derive(Clone)]
pub struct PresentationSigner {
    pub participant_did: String,
    pub key_id: String,
    pub private_jwk: Jwk,
}

/// Selects the signing key pair backing presentation generation.
pub struct PresentationCreatorRegistry {
    key_pairs: Arc<KeyPairService>,
    keystore: Keystore,
}

impl PresentationCreatorRegistry {
    pub fn new(key_pairs: Arc<KeyPairService>, keystore: Keystore) -> Self {
        Self {
            key_pairs,
            keystore,
        }
    }

    /// Resolves the participant's default signing pair and its private key.
    pub async fn signer_for(
        &self,
        participant: &ParticipantContext,
    ) -> Result<PresentationSigner, PresentationError> {
        let pair = self
            .key_pairs
            .default_signing_pair(&participant.participant_context_id)
            .await
            .map_err(|e| match e {
                ServiceError::NotFound(msg) => PresentationError::NoSigningKey(msg),
                other => PresentationError::Generation(other.to_string()),
            })?;

        let private_jwk: Jwk = self
            .keystore
            .retrieve(&pair.private_key_alias)
            .await
            .map_err(|e| PresentationError::Generation(e.to_string()))?
            .ok_or_else(|| {
                PresentationError::NoSigningKey(format!(
                    "private key {} is gone",
                    pair.private_key_alias
                ))
            })?;

        Ok(PresentationSigner {
            participant_did: participant.did.clone(),
            key_id: pair.key_id,
            private_jwk,
        })
    }
}

/// Creates verifiable presentations over stored credentials.
pub struct VerifiablePresentationService {
    registry: PresentationCreatorRegistry,
}

impl VerifiablePresentationService {
    pub fn new(registry: PresentationCreatorRegistry) -> Self {
        Self { registry }
    }

    /// Builds one presentation per credential format present in the input.
    ///
    /// An empty input still yields a single (empty) JWT presentation so a
    /// successful query always produces a verifiable response.
    pub async fn create_presentation(
        &self,
        participant: &ParticipantContext,
        credentials: &[CredentialResource],
        audience: Option<&str>,
    ) -> Result<Vec<Value>, PresentationError> {
        let signer = self.registry.signer_for(participant).await?;

        let of_format = |format: CredentialFormat| -> Vec<Value> {
            credentials
                .iter()
                .filter(|c| c.verifiable_credential.format == format)
                .map(|c| c.verifiable_credential.raw_as_value())
                .collect()
        };

        let jwt_credentials = of_format(CredentialFormat::Vc1Jwt);
        let ld_credentials = of_format(CredentialFormat::Vc1Ld);
        let jose_credentials = of_format(CredentialFormat::Vc2Jose);

        let mut presentations = Vec::new();

        if !ld_credentials.is_empty() {
            presentations.push(ldp::generate(&signer, ld_credentials)?);
        }
        if !jose_credentials.is_empty() {
            presentations.push(jose::generate(&signer, audience, jose_credentials)?);
        }
        if !jwt_credentials.is_empty() || presentations.is_empty() {
            presentations.push(jwt::generate(&signer, audience, jwt_credentials)?);
        }

        Ok(presentations)
    }
}
