use crate::encryptor::plaintext::NoEncryption;
use crate::{repository::SecretRepository, Error, Keystore};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, RwLock};

#[derive(Default)]
pub struct MockSecretRepository {
    secrets: RwLock<Vec<(String, Vec<u8>)>>,
}

impl MockSecretRepository {
    pub(crate) fn new(secrets: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            secrets: RwLock::new(secrets),
        }
    }
}

#[async_trait]
impl SecretRepository for MockSecretRepository {
    async fn store(&self, kid: &str, key: &[u8]) -> Result<(), Error> {
        let mut secrets = self.secrets.write().unwrap();
        if let Some(entry) = secrets.iter_mut().find(|(k, _)| k == kid) {
            entry.1 = key.to_owned();
        } else {
            secrets.push((kid.to_string(), key.to_owned()));
        }
        Ok(())
    }

    async fn find(&self, kid: &str) -> Result<Option<Vec<u8>>, Error> {
        let secrets = self.secrets.read().unwrap();
        let secret = secrets.iter().find(|(k, _)| k == kid);
        Ok(secret.map(|(_, v)| v.clone()))
    }

    async fn delete(&self, kid: &str) -> Result<(), Error> {
        let mut secrets = self.secrets.write().unwrap();
        let index = secrets.iter().position(|(k, _)| k == kid);
        if let Some(index) = index {
            secrets.remove(index);
        }
        Ok(())
    }
}

impl Keystore {
    /// Create a key store with in-memory repository and no-op encryption
    /// backends, seeded with the given secrets. For testing purposes.
    pub fn with_mock_configs<T>(secrets: Vec<(String, T)>) -> Self
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let serialized_secrets = secrets
            .into_iter()
            .map(|(k, v)| (k, serde_json::to_vec(&v).unwrap()))
            .collect();
        let mock_repository = MockSecretRepository::new(serialized_secrets);
        Self {
            repository: Arc::new(mock_repository),
            encryptor: Arc::new(NoEncryption),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{encryptor::KeyEncryption, Keystore};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    // Simple mock encryptor that reverses the key material.
    struct MockEncryptor;

    #[async_trait]
    impl KeyEncryption for MockEncryptor {
        async fn encrypt(&self, key: &[u8]) -> Result<Vec<u8>, crate::Error> {
            let mut key = key.to_vec();
            key.reverse();
            Ok(key)
        }

        async fn decrypt(&self, key: &[u8]) -> Result<Vec<u8>, crate::Error> {
            let mut key = key.to_vec();
            key.reverse();
            Ok(key)
        }
    }

    #[tokio::test]
    async fn test_keystore_flow() {
        let signing_key: Value = json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "Z0GqpN71rMcnAkky6_J6Bfknr8B-TBsekG3qdI0EQX4",
            "d": "fI1u4riKKd99eox08GlThknq-vEJXcKBI28aiUqArLo"
        });

        let no_secrets: Vec<(String, Value)> = vec![];
        let keystore = Keystore::with_mock_configs(no_secrets).with_encryptor(MockEncryptor);

        keystore.store("kid-1", &signing_key).await.unwrap();

        // Stored bytes must differ from the serialized secret.
        let stored = keystore.repository.find("kid-1").await.unwrap().unwrap();
        assert_ne!(stored, serde_json::to_vec(&signing_key).unwrap());

        // Retrieval must round-trip through the encryptor.
        let retrieved: Value = keystore.retrieve("kid-1").await.unwrap().unwrap();
        assert_eq!(retrieved, signing_key);

        // Storing under the same kid replaces the previous material.
        let replacement = json!({"token": "fresh"});
        keystore.store("kid-1", &replacement).await.unwrap();
        let retrieved: Value = keystore.retrieve("kid-1").await.unwrap().unwrap();
        assert_eq!(retrieved, replacement);

        // Unknown kids resolve to None.
        let missing: Option<Value> = keystore.retrieve("unknown").await.unwrap();
        assert!(missing.is_none());

        // Deletion is idempotent.
        keystore.delete("kid-1").await.unwrap();
        let deleted: Option<Value> = keystore.retrieve("kid-1").await.unwrap();
        assert!(deleted.is_none());
        assert!(keystore.delete("kid-1").await.is_ok());
    }
}
