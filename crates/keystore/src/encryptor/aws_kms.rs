use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_kms::{primitives::Blob, Client};
use tokio::sync::OnceCell;

use crate::{encryptor::KeyEncryption, Error, ErrorKind};

/// Key-wrapping backend delegating to an AWS KMS key.
pub struct AwsKmsEncryptor {
    key_id: String,
    client: OnceCell<Client>,
}

impl AwsKmsEncryptor {
    pub fn new(key_id: String) -> Self {
        Self {
            key_id,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
                Client::new(&config)
            })
            .await
    }
}

#[async_trait]
impl KeyEncryption for AwsKmsEncryptor {
    async fn encrypt(&self, key_material: &[u8]) -> Result<Vec<u8>, Error> {
        let response = self
            .client()
            .await
            .encrypt()
            .key_id(&self.key_id)
            .plaintext(Blob::new(key_material))
            .send()
            .await?;

        response
            .ciphertext_blob()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| Error::msg(ErrorKind::EncryptionFailure, "kms returned no ciphertext"))
    }

    async fn decrypt(&self, encrypted_key: &[u8]) -> Result<Vec<u8>, Error> {
        let response = self
            .client()
            .await
            .decrypt()
            .key_id(&self.key_id)
            .ciphertext_blob(Blob::new(encrypted_key))
            .send()
            .await?;

        response
            .plaintext()
            .map(|blob| blob.as_ref().to_vec())
            .ok_or_else(|| Error::msg(ErrorKind::DecryptionFailure, "kms returned no plaintext"))
    }
}
