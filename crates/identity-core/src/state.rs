//! Shared application state wired from repositories and the keystore.

use std::sync::Arc;

use database::Repository;
use keystore::Keystore;

use crate::{
    events::EventBus,
    keypairs::KeyPairService,
    model::{CredentialResource, KeyPairResource, ParticipantContext},
    participants::ParticipantContextService,
    presentation::{PresentationCreatorRegistry, VerifiablePresentationService},
    query::CredentialQueryResolver,
    repository,
    resolver::{DidResolver, ParticipantKeyResolver},
    status::CredentialStatusCheckService,
    verification::SelfIssuedTokenVerifier,
};

/// Everything the web plugins need, built once per process.
#[derive(Clone)]
pub struct HubState {
    pub participants: Arc<ParticipantContextService>,
    pub key_pairs: Arc<KeyPairService>,
    pub credentials: Arc<dyn Repository<CredentialResource>>,
    pub query_resolver: Arc<CredentialQueryResolver>,
    pub presentations: Arc<VerifiablePresentationService>,
    pub verifier: Arc<SelfIssuedTokenVerifier>,
    pub events: EventBus,
}

impl HubState {
    /// Wires the service graph on top of the given persistence handles.
    pub fn build(
        participant_store: Arc<dyn Repository<ParticipantContext>>,
        keypair_store: Arc<dyn Repository<KeyPairResource>>,
        credential_store: Arc<dyn Repository<CredentialResource>>,
        keystore: Keystore,
    ) -> Self {
        let events = EventBus::new();

        let key_pairs = Arc::new(KeyPairService::new(
            keypair_store.clone(),
            keystore.clone(),
            events.clone(),
        ));

        let participants = Arc::new(ParticipantContextService::new(
            participant_store.clone(),
            key_pairs.clone(),
            keystore.clone(),
            events.clone(),
        ));

        let query_resolver = Arc::new(CredentialQueryResolver::new(
            credential_store.clone(),
            CredentialStatusCheckService::new(),
        ));

        let presentations = Arc::new(VerifiablePresentationService::new(
            PresentationCreatorRegistry::new(key_pairs.clone(), keystore),
        ));

        let verifier = Arc::new(SelfIssuedTokenVerifier::new(
            DidResolver::new(),
            ParticipantKeyResolver::new(keypair_store),
            participant_store,
        ));

        Self {
            participants,
            key_pairs,
            credentials: credential_store,
            query_resolver,
            presentations,
            verifier,
            events,
        }
    }

    /// Builds the state on the shared MongoDB database and the
    /// environment-configured keystore.
    pub fn from_env() -> Self {
        Self::build(
            repository::participant_repository(),
            repository::keypair_repository(),
            repository::credential_repository(),
            Keystore::new(),
        )
    }
}
