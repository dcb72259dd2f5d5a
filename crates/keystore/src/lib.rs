//! Encrypted secret storage for the identity hub.
//!
//! Private key material and API secrets never reach the database unwrapped:
//! a [`KeyEncryption`] backend wraps serialized secrets before a
//! [`SecretRepository`] persists them under their key identifier (kid).

mod encryptor;
mod error;
mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod tests;

pub use encryptor::KeyEncryption;
pub use error::{Error, ErrorKind};
pub use repository::SecretRepository;

use encryptor::{aws_kms::AwsKmsEncryptor, plaintext::NoEncryption};
use repository::mongodb::MongoSecretRepository;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use zeroize::Zeroize;

/// A keystore for managing wrapped secrets.
#[derive(Clone)]
pub struct Keystore {
    pub(crate) repository: Arc<dyn SecretRepository>,
    pub(crate) encryptor: Arc<dyn KeyEncryption>,
}

impl Default for Keystore {
    fn default() -> Self {
        Self::new()
    }
}

impl Keystore {
    /// Create a keystore on the shared MongoDB database.
    ///
    /// The key-wrapping backend is selected from the environment: when
    /// `KEYSTORE_KMS_KEY_ID` is set, secrets are wrapped with that AWS KMS
    /// key, otherwise they are stored unwrapped.
    pub fn new() -> Self {
        let encryptor: Arc<dyn KeyEncryption> = match std::env::var("KEYSTORE_KMS_KEY_ID") {
            Ok(key_id) => Arc::new(AwsKmsEncryptor::new(key_id)),
            Err(_) => {
                tracing::warn!("KEYSTORE_KMS_KEY_ID not set, storing secrets unwrapped");
                Arc::new(NoEncryption)
            }
        };

        Self {
            repository: Arc::new(MongoSecretRepository::new()),
            encryptor,
        }
    }

    /// Replace the key-wrapping backend.
    pub fn with_encryptor(self, encryptor: impl KeyEncryption + 'static) -> Self {
        Self {
            encryptor: Arc::new(encryptor),
            ..self
        }
    }

    /// Serialize, wrap and persist a secret under the given kid.
    pub async fn store<T>(&self, kid: &str, key: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let mut serialized = serde_json::to_vec(key)?;
        let wrapped = self.encryptor.encrypt(&serialized).await?;
        serialized.zeroize();

        self.repository.store(kid, &wrapped).await
    }

    /// Fetch and unwrap the secret stored under the given kid.
    pub async fn retrieve<T>(&self, kid: &str) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
    {
        let Some(wrapped) = self.repository.find(kid).await? else {
            return Ok(None);
        };

        let mut unwrapped = self.encryptor.decrypt(&wrapped).await?;
        let secret = serde_json::from_slice(&unwrapped)?;
        unwrapped.zeroize();

        Ok(Some(secret))
    }

    /// Remove the secret stored under the given kid.
    ///
    /// Deleting an absent kid is not an error.
    pub async fn delete(&self, kid: &str) -> Result<(), Error> {
        self.repository.delete(kid).await
    }
}
