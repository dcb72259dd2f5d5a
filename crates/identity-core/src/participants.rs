//! Participant context management.

use std::sync::Arc;

use database::Repository;
use did_core::{
    crypto::{Ed25519KeyPair, Generate, ToMultikey},
    methods::DidKeyMethod,
};
use keystore::Keystore;
use mongodb::bson::doc;

use crate::{
    errors::ServiceError,
    events::{EventBus, HubEvent},
    keypairs::KeyPairService,
    model::{
        CreatedParticipantContext, ParticipantContext, ParticipantContextState,
        ParticipantManifest,
    },
    now_unix_millis, token,
};

/// Manages the lifecycle of participant contexts.
pub struct ParticipantContextService {
    store: Arc<dyn Repository<ParticipantContext>>,
    key_pairs: Arc<KeyPairService>,
    keystore: Keystore,
    events: EventBus,
}

impl ParticipantContextService {
    pub fn new(
        store: Arc<dyn Repository<ParticipantContext>>,
        key_pairs: Arc<KeyPairService>,
        keystore: Keystore,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            key_pairs,
            keystore,
            events,
        }
    }

    /// Creates a participant context from a manifest.
    ///
    /// Derives the DID when none is given, provisions the initial key pair
    /// and mints the API token. The token is returned here and never again.
    pub async fn create(
        &self,
        manifest: &ParticipantManifest,
    ) -> Result<CreatedParticipantContext, ServiceError> {
        let participant_context_id = manifest.participant_context_id.clone();
        if participant_context_id.is_empty() {
            return Err(ServiceError::BadRequest(
                "participant_context_id must not be empty".to_string(),
            ));
        }

        if self.find(&participant_context_id).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "participant context {participant_context_id} already exists"
            )));
        }

        // The initial key pair also determines the DID when none is given.
        let initial_keypair = Ed25519KeyPair::new()?;
        let did = match &manifest.did {
            Some(did) => did.clone(),
            None => DidKeyMethod::generate(&initial_keypair),
        };

        let mut key_descriptor = manifest.key.clone().unwrap_or_default();
        if key_descriptor.key_id.is_none() && manifest.did.is_none() {
            // A did:key method id is the multikey fragment by convention.
            key_descriptor.key_id = Some(format!("{did}#{}", initial_keypair.to_multikey()));
        }

        let api_token_alias = format!("{participant_context_id}-api-key");
        let api_token = token::generate_api_token(&participant_context_id)?;
        self.keystore.store(&api_token_alias, &api_token).await?;

        let now = now_unix_millis();
        let context = ParticipantContext {
            id: None,
            participant_context_id: participant_context_id.clone(),
            did: did.clone(),
            state: if manifest.active {
                ParticipantContextState::Activated
            } else {
                ParticipantContextState::Created
            },
            api_token_alias,
            roles: manifest.roles.clone(),
            created_at: now,
            last_modified: now,
        };
        self.store.store(context).await?;

        self.key_pairs
            .adopt_key_pair(
                &participant_context_id,
                &did,
                &key_descriptor,
                true,
                initial_keypair,
            )
            .await?;

        self.events.publish(HubEvent::ParticipantContextCreated {
            participant_context_id: participant_context_id.clone(),
        });

        Ok(CreatedParticipantContext {
            participant_context_id,
            did,
            api_token,
        })
    }

    pub async fn get(
        &self,
        participant_context_id: &str,
    ) -> Result<ParticipantContext, ServiceError> {
        self.find(participant_context_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!(
                "no participant context {participant_context_id}"
            ))
        })
    }

    pub async fn find(
        &self,
        participant_context_id: &str,
    ) -> Result<Option<ParticipantContext>, ServiceError> {
        Ok(self
            .store
            .find_one_by(doc! {"participant_context_id": participant_context_id})
            .await?)
    }

    /// Deletes a participant context with its key pairs and secrets.
    pub async fn delete(&self, participant_context_id: &str) -> Result<(), ServiceError> {
        let context = self.get(participant_context_id).await?;

        self.key_pairs.delete_all(participant_context_id).await?;
        self.keystore.delete(&context.api_token_alias).await?;

        if let Some(id) = context.id {
            self.store.delete_one(id).await?;
        }

        self.events.publish(HubEvent::ParticipantContextDeleted {
            participant_context_id: participant_context_id.to_string(),
        });

        Ok(())
    }

    /// Activates a created or deactivated participant.
    pub async fn activate(&self, participant_context_id: &str) -> Result<(), ServiceError> {
        self.transition(participant_context_id, ParticipantContextState::Activated)
            .await
    }

    /// Deactivates an activated participant.
    pub async fn deactivate(&self, participant_context_id: &str) -> Result<(), ServiceError> {
        self.transition(participant_context_id, ParticipantContextState::Deactivated)
            .await
    }

    async fn transition(
        &self,
        participant_context_id: &str,
        target: ParticipantContextState,
    ) -> Result<(), ServiceError> {
        let mut context = self.get(participant_context_id).await?;

        let allowed = match target {
            ParticipantContextState::Activated => matches!(
                context.state,
                ParticipantContextState::Created | ParticipantContextState::Deactivated
            ),
            ParticipantContextState::Deactivated => {
                context.state == ParticipantContextState::Activated
            }
            ParticipantContextState::Created => false,
        };

        if !allowed {
            return Err(ServiceError::BadState(format!(
                "cannot transition participant {participant_context_id} from {:?} to {target:?}",
                context.state
            )));
        }

        context.state = target;
        context.last_modified = now_unix_millis();
        self.store.update(context).await?;

        self.events.publish(HubEvent::ParticipantContextUpdated {
            participant_context_id: participant_context_id.to_string(),
        });

        Ok(())
    }

    /// Replaces the participant's API token, returning the new one.
    pub async fn regenerate_api_token(
        &self,
        participant_context_id: &str,
    ) -> Result<String, ServiceError> {
        let context = self.get(participant_context_id).await?;

        let api_token = token::generate_api_token(participant_context_id)?;
        self.keystore.store(&context.api_token_alias, &api_token).await?;

        self.events.publish(HubEvent::ParticipantContextUpdated {
            participant_context_id: participant_context_id.to_string(),
        });

        Ok(api_token)
    }

    /// The currently stored API token, if any.
    pub async fn stored_api_token(
        &self,
        participant_context_id: &str,
    ) -> Result<Option<String>, ServiceError> {
        let context = self.get(participant_context_id).await?;
        Ok(self.keystore.retrieve(&context.api_token_alias).await?)
    }
}
