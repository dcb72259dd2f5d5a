//! Key pair lifecycle management.

use std::sync::Arc;

use database::Repository;
use did_core::{
    crypto::{Ed25519KeyPair, Generate},
    jwk::Jwk,
};
use keystore::Keystore;
use mongodb::bson::doc;

use crate::{
    errors::ServiceError,
    events::{EventBus, HubEvent},
    model::{KeyDescriptor, KeyPairResource, KeyPairState},
    now_unix_millis,
};

const DEFAULT_KEY_USAGE: &str = "signing";

/// Manages the key pairs of all participants.
///
/// State machine: `Created → Activated → Rotated | Revoked`. Rotation
/// destroys the private key (verification stays possible), revocation
/// additionally withdraws the public key from resolution.
pub struct KeyPairService {
    store: Arc<dyn Repository<KeyPairResource>>,
    keystore: Keystore,
    events: EventBus,
}

impl KeyPairService {
    pub fn new(
        store: Arc<dyn Repository<KeyPairResource>>,
        keystore: Keystore,
        events: EventBus,
    ) -> Self {
        Self {
            store,
            keystore,
            events,
        }
    }

    /// Generates and persists a new key pair for a participant.
    pub async fn add_key_pair(
        &self,
        participant_context_id: &str,
        did: &str,
        descriptor: &KeyDescriptor,
        make_default: bool,
    ) -> Result<KeyPairResource, ServiceError> {
        let keypair = Ed25519KeyPair::new()?;
        self.adopt_key_pair(participant_context_id, did, descriptor, make_default, keypair)
            .await
    }

    /// Persists an existing key pair for a participant.
    ///
    /// Used when the key material already determines an identifier, as with
    /// did:key DIDs derived from the initial pair.
    pub async fn adopt_key_pair(
        &self,
        participant_context_id: &str,
        did: &str,
        descriptor: &KeyDescriptor,
        make_default: bool,
        keypair: Ed25519KeyPair,
    ) -> Result<KeyPairResource, ServiceError> {
        let index = self
            .store
            .count_by(doc! {"participant_context_id": participant_context_id})
            .await?
            + 1;

        let key_id = descriptor
            .key_id
            .clone()
            .unwrap_or_else(|| format!("{did}#key-{index}"));
        let private_key_alias = descriptor
            .private_key_alias
            .clone()
            .unwrap_or_else(|| format!("{participant_context_id}-key-{index}"));

        if self.find(&key_id).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "key pair {key_id} already exists"
            )));
        }

        let private_jwk = Jwk::from(&keypair);
        self.keystore.store(&private_key_alias, &private_jwk).await?;

        let now = now_unix_millis();
        let resource = KeyPairResource {
            id: None,
            key_id: key_id.clone(),
            participant_context_id: participant_context_id.to_string(),
            state: if descriptor.active {
                KeyPairState::Activated
            } else {
                KeyPairState::Created
            },
            usage: descriptor
                .usage
                .clone()
                .unwrap_or_else(|| DEFAULT_KEY_USAGE.to_string()),
            serialized_public_key: serde_json::to_string(&private_jwk.to_public())
                .map_err(|e| ServiceError::BadRequest(e.to_string()))?,
            private_key_alias,
            is_default_pair: make_default,
            created_at: now,
            last_modified: now,
        };

        if make_default {
            self.clear_default_flag(participant_context_id).await?;
        }

        let resource = self.store.store(resource).await?;
        self.events.publish(HubEvent::KeyPairAdded {
            participant_context_id: participant_context_id.to_string(),
            key_id,
        });

        Ok(resource)
    }

    /// Activates a freshly created pair.
    pub async fn activate(&self, key_id: &str) -> Result<(), ServiceError> {
        let mut resource = self.get(key_id).await?;

        if resource.state != KeyPairState::Created {
            return Err(ServiceError::BadState(format!(
                "cannot activate key pair in state {:?}",
                resource.state
            )));
        }

        resource.state = KeyPairState::Activated;
        resource.last_modified = now_unix_millis();
        let participant_context_id = resource.participant_context_id.clone();
        self.store.update(resource).await?;

        self.events.publish(HubEvent::KeyPairActivated {
            participant_context_id,
            key_id: key_id.to_string(),
        });

        Ok(())
    }

    /// Rotates a pair out of service, optionally creating its successor.
    ///
    /// The private key is destroyed; signatures made with the old pair
    /// remain verifiable.
    pub async fn rotate(
        &self,
        key_id: &str,
        successor: Option<&KeyDescriptor>,
    ) -> Result<Option<KeyPairResource>, ServiceError> {
        self.retire(key_id, KeyPairState::Rotated, successor).await
    }

    /// Revokes a pair, optionally creating its successor.
    ///
    /// On top of rotation semantics, the public key is withdrawn from
    /// resolution: verification with a revoked pair must fail.
    pub async fn revoke(
        &self,
        key_id: &str,
        successor: Option<&KeyDescriptor>,
    ) -> Result<Option<KeyPairResource>, ServiceError> {
        self.retire(key_id, KeyPairState::Revoked, successor).await
    }

    async fn retire(
        &self,
        key_id: &str,
        target: KeyPairState,
        successor: Option<&KeyDescriptor>,
    ) -> Result<Option<KeyPairResource>, ServiceError> {
        let mut resource = self.get(key_id).await?;

        if matches!(resource.state, KeyPairState::Rotated | KeyPairState::Revoked) {
            return Err(ServiceError::BadState(format!(
                "key pair {key_id} is already retired ({:?})",
                resource.state
            )));
        }

        self.keystore.delete(&resource.private_key_alias).await?;

        resource.state = target;
        resource.is_default_pair = false;
        resource.last_modified = now_unix_millis();
        let participant_context_id = resource.participant_context_id.clone();
        let did = resource
            .key_id
            .split('#')
            .next()
            .unwrap_or(&resource.key_id)
            .to_string();
        self.store.update(resource).await?;

        let event = match target {
            KeyPairState::Rotated => HubEvent::KeyPairRotated {
                participant_context_id: participant_context_id.clone(),
                key_id: key_id.to_string(),
            },
            _ => HubEvent::KeyPairRevoked {
                participant_context_id: participant_context_id.clone(),
                key_id: key_id.to_string(),
            },
        };
        self.events.publish(event);

        match successor {
            Some(descriptor) => {
                let successor = self
                    .add_key_pair(&participant_context_id, &did, descriptor, true)
                    .await?;
                Ok(Some(successor))
            }
            None => Ok(None),
        }
    }

    pub async fn get(&self, key_id: &str) -> Result<KeyPairResource, ServiceError> {
        self.find(key_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("no key pair {key_id}")))
    }

    pub async fn find(&self, key_id: &str) -> Result<Option<KeyPairResource>, ServiceError> {
        Ok(self.store.find_one_by(doc! {"key_id": key_id}).await?)
    }

    pub async fn list(
        &self,
        participant_context_id: &str,
    ) -> Result<Vec<KeyPairResource>, ServiceError> {
        Ok(self
            .store
            .find_all_by(
                doc! {"participant_context_id": participant_context_id},
                None,
            )
            .await?)
    }

    /// The pair presentations are signed with: the default pair if one is
    /// flagged, otherwise any activated pair.
    pub async fn default_signing_pair(
        &self,
        participant_context_id: &str,
    ) -> Result<KeyPairResource, ServiceError> {
        let pairs = self.list(participant_context_id).await?;

        pairs
            .iter()
            .find(|p| p.state == KeyPairState::Activated && p.is_default_pair)
            .or_else(|| pairs.iter().find(|p| p.state == KeyPairState::Activated))
            .cloned()
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "participant {participant_context_id} has no activated key pair"
                ))
            })
    }

    /// Removes every key pair resource and private key of a participant.
    pub async fn delete_all(&self, participant_context_id: &str) -> Result<(), ServiceError> {
        for pair in self.list(participant_context_id).await? {
            self.keystore.delete(&pair.private_key_alias).await?;
        }
        self.store
            .delete_all_by(doc! {"participant_context_id": participant_context_id})
            .await?;
        Ok(())
    }

    async fn clear_default_flag(&self, participant_context_id: &str) -> Result<(), ServiceError> {
        for mut pair in self.list(participant_context_id).await? {
            if pair.is_default_pair {
                pair.is_default_pair = false;
                pair.last_modified = now_unix_millis();
                self.store.update(pair).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::MockRepository;

    fn service() -> KeyPairService {
        let secrets: Vec<(String, Jwk)> = vec![];
        KeyPairService::new(
            Arc::new(MockRepository::new(vec![])),
            Keystore::with_mock_configs(secrets),
            EventBus::new(),
        )
    }

    #[tokio::test]
    async fn test_add_then_rotate_destroys_private_key() {
        let service = service();

        let pair = service
            .add_key_pair("acme", "did:web:acme.example", &KeyDescriptor::default(), true)
            .await
            .unwrap();
        assert_eq!(pair.key_id, "did:web:acme.example#key-1");
        assert_eq!(pair.state, KeyPairState::Activated);
        assert!(pair.is_default_pair);

        let private: Option<Jwk> = service
            .keystore
            .retrieve(&pair.private_key_alias)
            .await
            .unwrap();
        assert!(private.is_some());

        let successor = service
            .rotate(&pair.key_id, Some(&KeyDescriptor::default()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(successor.key_id, "did:web:acme.example#key-2");
        assert!(successor.is_default_pair);

        let rotated = service.get(&pair.key_id).await.unwrap();
        assert_eq!(rotated.state, KeyPairState::Rotated);
        assert!(!rotated.is_default_pair);

        // Old private material is gone, the public half survives.
        let private: Option<Jwk> = service
            .keystore
            .retrieve(&rotated.private_key_alias)
            .await
            .unwrap();
        assert!(private.is_none());
        assert!(rotated.public_jwk().is_ok());
    }

    #[tokio::test]
    async fn test_retired_pairs_cannot_come_back() {
        let service = service();

        let pair = service
            .add_key_pair("acme", "did:web:acme.example", &KeyDescriptor::default(), false)
            .await
            .unwrap();

        service.revoke(&pair.key_id, None).await.unwrap();
        assert!(matches!(
            service.rotate(&pair.key_id, None).await,
            Err(ServiceError::BadState(_))
        ));
        assert!(matches!(
            service.activate(&pair.key_id).await,
            Err(ServiceError::BadState(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_key_ids_are_rejected() {
        let service = service();
        let descriptor = KeyDescriptor {
            key_id: Some("did:web:acme.example#signing".to_string()),
            ..Default::default()
        };

        service
            .add_key_pair("acme", "did:web:acme.example", &descriptor, false)
            .await
            .unwrap();
        assert!(matches!(
            service
                .add_key_pair("acme", "did:web:acme.example", &descriptor, false)
                .await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_default_signing_pair_selection() {
        let service = service();

        assert!(matches!(
            service.default_signing_pair("acme").await,
            Err(ServiceError::NotFound(_))
        ));

        service
            .add_key_pair("acme", "did:web:acme.example", &KeyDescriptor::default(), false)
            .await
            .unwrap();
        let second = service
            .add_key_pair("acme", "did:web:acme.example", &KeyDescriptor::default(), true)
            .await
            .unwrap();

        let selected = service.default_signing_pair("acme").await.unwrap();
        assert_eq!(selected.key_id, second.key_id);
    }
}
