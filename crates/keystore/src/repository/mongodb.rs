use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::ReplaceOptions,
    Collection,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::{repository::SecretRepository, Error};

static SECRETS_COLLECTION: OnceCell<Collection<SecretEntry>> = OnceCell::new();

/// Wire format of a wrapped secret at rest.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct SecretEntry {
    #[serde(rename = "_id")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<ObjectId>,

    pub(crate) kid: String,

    // wrapped key material
    pub(crate) material: Vec<u8>,
}

/// Secret storage on the shared MongoDB database.
#[derive(Debug, Clone)]
pub(crate) struct MongoSecretRepository {
    collection: Collection<SecretEntry>,
}

impl MongoSecretRepository {
    /// Create a repository bound to the `secrets` collection.
    ///
    /// Calling this method many times will return handles on the same collection.
    pub(crate) fn new() -> Self {
        let collection = SECRETS_COLLECTION
            .get_or_init(|| {
                let db = database::get_or_init_database();
                let task = async move {
                    let db_lock = db.write().await;
                    db_lock.collection::<SecretEntry>("secrets").clone()
                };
                tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(task))
            })
            .clone();

        MongoSecretRepository { collection }
    }
}

#[async_trait]
impl SecretRepository for MongoSecretRepository {
    async fn store(&self, kid: &str, key: &[u8]) -> Result<(), Error> {
        let entry = SecretEntry {
            id: None,
            kid: kid.to_owned(),
            material: key.to_owned(),
        };

        self.collection
            .replace_one(doc! {"kid": kid}, entry)
            .with_options(ReplaceOptions::builder().upsert(true).build())
            .await?;

        Ok(())
    }

    async fn find(&self, kid: &str) -> Result<Option<Vec<u8>>, Error> {
        let entry = self.collection.find_one(doc! {"kid": kid}).await?;
        Ok(entry.map(|e| e.material))
    }

    async fn delete(&self, kid: &str) -> Result<(), Error> {
        self.collection.delete_one(doc! {"kid": kid}).await?;
        Ok(())
    }
}
