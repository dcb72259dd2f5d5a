use async_trait::async_trait;

use crate::{encryptor::KeyEncryption, Error};

/// Pass-through backend storing key material unwrapped.
///
/// Default when no KMS key is configured. Not meant for production setups.
pub struct NoEncryption;

#[async_trait]
impl KeyEncryption for NoEncryption {
    async fn encrypt(&self, key_material: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(key_material.to_owned())
    }

    async fn decrypt(&self, encrypted_key: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(encrypted_key.to_owned())
    }
}
