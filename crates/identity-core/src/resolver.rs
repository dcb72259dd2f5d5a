//! Public key resolution, remote (DID documents) and local (key pair store).

use std::sync::Arc;

use database::Repository;
use did_core::{
    crypto::Ed25519KeyPair,
    document::{Document, KeyFormat},
    jwk::Jwk,
    methods::{DidKeyMethod, DidMethodError, DidWebResolver},
};
use mongodb::bson::doc;
use thiserror::Error;

use crate::model::{KeyPairResource, KeyPairState};

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error(transparent)]
    Method(#[from] DidMethodError),
    #[error("no verification method {0}")]
    KeyNotFound(String),
    #[error("unsupported key format on {0}")]
    UnsupportedKeyFormat(String),
}

/// Resolves DIDs and dereferences their public keys.
#[derive(Debug, Clone, Default)]
pub struct DidResolver {
    web: DidWebResolver,
}

impl DidResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a DID into its document.
    pub async fn resolve(&self, did: &str) -> Result<Document, ResolverError> {
        if did.starts_with("did:key:") {
            return Ok(DidKeyMethod::resolve(did)?);
        }
        if did.starts_with("did:web:") {
            return Ok(self.web.resolve(did).await?);
        }

        Err(DidMethodError::MethodNotSupported(did.to_string()).into())
    }

    /// Dereferences a DID URL with fragment into the public JWK of the
    /// verification method it names.
    pub async fn resolve_public_key(&self, did_url: &str) -> Result<Jwk, ResolverError> {
        let did = did_url.split('#').next().unwrap_or(did_url);
        let document = self.resolve(did).await?;

        let method = document
            .find_verification_method(did_url)
            .ok_or_else(|| ResolverError::KeyNotFound(did_url.to_string()))?;

        match method.public_key() {
            Some(KeyFormat::Jwk(jwk)) => Ok(jwk.to_public()),
            Some(KeyFormat::Multibase(multikey)) => {
                let keypair = Ed25519KeyPair::from_multikey(&multikey)
                    .map_err(|_| ResolverError::UnsupportedKeyFormat(did_url.to_string()))?;
                Ok(Jwk::from(&keypair))
            }
            _ => Err(ResolverError::UnsupportedKeyFormat(did_url.to_string())),
        }
    }
}

/// Resolves public keys from a participant's own key pair resources.
///
/// Revoked pairs never resolve. An exact key id match is preferred; the
/// fragment alone works as a local fallback.
pub struct ParticipantKeyResolver {
    key_pairs: Arc<dyn Repository<KeyPairResource>>,
}

impl ParticipantKeyResolver {
    pub fn new(key_pairs: Arc<dyn Repository<KeyPairResource>>) -> Self {
        Self { key_pairs }
    }

    pub async fn resolve_key(
        &self,
        participant_context_id: &str,
        key_id: &str,
    ) -> Result<Jwk, ResolverError> {
        let pairs = self
            .key_pairs
            .find_all_by(
                doc! {"participant_context_id": participant_context_id},
                None,
            )
            .await
            .map_err(|_| ResolverError::KeyNotFound(key_id.to_string()))?;

        let fragment = key_id.rfind('#').map(|i| &key_id[i..]);

        let resolvable = |pair: &&KeyPairResource| pair.state != KeyPairState::Revoked;
        let pair = pairs
            .iter()
            .filter(resolvable)
            .find(|pair| pair.key_id == key_id)
            .or_else(|| {
                pairs.iter().filter(resolvable).find(|pair| {
                    match (fragment, pair.key_id.rfind('#').map(|i| &pair.key_id[i..])) {
                        (Some(wanted), Some(found)) => wanted == found,
                        _ => false,
                    }
                })
            })
            .ok_or_else(|| ResolverError::KeyNotFound(key_id.to_string()))?;

        pair.public_jwk()
            .map_err(|_| ResolverError::UnsupportedKeyFormat(key_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::MockRepository;
    use did_core::crypto::{Generate, ToMultikey};

    #[tokio::test]
    async fn test_did_key_resolution_is_local() {
        let keypair = Ed25519KeyPair::new().unwrap();
        let did = DidKeyMethod::generate(&keypair);
        let key_id = format!("{did}#{}", keypair.to_multikey());

        let resolver = DidResolver::new();
        let jwk = resolver.resolve_public_key(&key_id).await.unwrap();
        assert_eq!(jwk.x, Jwk::from(&keypair).x);
        assert!(!jwk.is_private());
    }

    #[tokio::test]
    async fn test_unknown_methods_are_rejected() {
        let resolver = DidResolver::new();
        assert!(matches!(
            resolver.resolve("did:ion:abc").await,
            Err(ResolverError::Method(DidMethodError::MethodNotSupported(_)))
        ));
    }

    fn pair(key_id: &str, state: KeyPairState) -> KeyPairResource {
        let keypair = Ed25519KeyPair::new().unwrap();
        KeyPairResource {
            id: None,
            key_id: key_id.to_string(),
            participant_context_id: "acme".to_string(),
            state,
            usage: "signing".to_string(),
            serialized_public_key: serde_json::to_string(&Jwk::from(&keypair).to_public())
                .unwrap(),
            private_key_alias: "acme-key".to_string(),
            is_default_pair: false,
            created_at: 0,
            last_modified: 0,
        }
    }

    #[tokio::test]
    async fn test_participant_keys_resolve_unless_revoked() {
        let resolver = ParticipantKeyResolver::new(Arc::new(MockRepository::new(vec![
            pair("did:web:acme.example#key-1", KeyPairState::Activated),
            pair("did:web:acme.example#key-2", KeyPairState::Revoked),
        ])));

        assert!(resolver
            .resolve_key("acme", "did:web:acme.example#key-1")
            .await
            .is_ok());

        // Fragment-only lookup falls back onto the same pair.
        assert!(resolver.resolve_key("acme", "#key-1").await.is_ok());

        assert!(matches!(
            resolver.resolve_key("acme", "did:web:acme.example#key-2").await,
            Err(ResolverError::KeyNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve_key("acme", "#missing").await,
            Err(ResolverError::KeyNotFound(_))
        ));
    }
}
