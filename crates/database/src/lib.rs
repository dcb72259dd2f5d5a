use async_trait::async_trait;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document as BsonDocument},
    error::Error as MongoError,
    options::ClientOptions,
    Client, Collection, Database,
};
use once_cell::sync::OnceCell;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// A trait that ensures the entity has an `id` field.
pub trait Identifiable {
    fn id(&self) -> Option<ObjectId>;
    fn set_id(&mut self, id: ObjectId);
}

/// Definition of custom errors for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to convert to bson format")]
    BsonConversionError,
    #[error("generic: {0}")]
    Generic(String),
    #[error("missing identifier")]
    MissingIdentifier,
    #[error("target not found")]
    TargetNotFound,
}

static MONGO_DB: OnceCell<Arc<RwLock<Database>>> = OnceCell::new();

/// Get a handle to a database.
///
/// Many threads may call this function concurrently with different initializing functions,
/// but it is guaranteed that only one function will be executed.
pub fn get_or_init_database() -> Arc<RwLock<Database>> {
    MONGO_DB
        .get_or_init(|| {
            let mongo_uri = std::env::var("MONGO_URI").expect("MONGO_URI env variable required");
            let mongo_dbn = std::env::var("MONGO_DBN").expect("MONGO_DBN env variable required");

            // Create a handle to a database.
            let db = tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current().block_on(async move {
                    let client_options = ClientOptions::parse(mongo_uri)
                        .await
                        .expect("Failed to parse Mongo URI");
                    let client = Client::with_options(client_options)
                        .expect("Failed to create MongoDB client");

                    client.database(&mongo_dbn)
                })
            });

            Arc::new(RwLock::new(db))
        })
        .clone()
}

/// Definition of a trait for repository operations.
#[async_trait]
pub trait Repository<Entity>: Sync + Send
where
    Entity: Sized + Clone + Send + Sync + 'static,
    Entity: Identifiable + Unpin,
    Entity: Serialize + DeserializeOwned,
{
    fn get_collection(&self) -> Arc<RwLock<Collection<Entity>>>;

    async fn find_all(&self) -> Result<Vec<Entity>, RepositoryError> {
        self.find_all_by(doc! {}, None).await
    }

    /// Counts all entities matching the filter.
    async fn count_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError> {
        let collection = self.get_collection();
        let collection = collection.read().await;
        collection
            .count_documents(filter)
            .await?
            .try_into()
            .map_err(|_| RepositoryError::Generic("count overflow".to_owned()))
    }

    async fn find_one(&self, id: ObjectId) -> Result<Option<Entity>, RepositoryError> {
        self.find_one_by(doc! {"_id": id}).await
    }

    async fn find_one_by(&self, filter: BsonDocument) -> Result<Option<Entity>, RepositoryError> {
        let collection = self.get_collection();
        let collection = collection.read().await;
        Ok(collection.find_one(filter).await?)
    }

    async fn find_all_by(
        &self,
        filter: BsonDocument,
        limit: Option<i64>,
    ) -> Result<Vec<Entity>, RepositoryError> {
        let mut entities = Vec::new();
        let collection = self.get_collection();
        let collection = collection.read().await;

        let mut cursor = collection
            .find(filter)
            .with_options(
                mongodb::options::FindOptions::builder()
                    .limit(limit)
                    .build(),
            )
            .await?;
        while cursor.advance().await? {
            entities.push(cursor.deserialize_current()?);
        }

        Ok(entities)
    }

    /// Stores a new entity, assigning it an identifier on success.
    async fn store(&self, mut entity: Entity) -> Result<Entity, RepositoryError> {
        let collection = self.get_collection();
        let collection = collection.read().await;

        let metadata = collection.insert_one(entity.clone()).await?;
        if let Bson::ObjectId(oid) = metadata.inserted_id {
            entity.set_id(oid);
        }

        Ok(entity)
    }

    async fn update(&self, entity: Entity) -> Result<Entity, RepositoryError> {
        let id = entity.id().ok_or(RepositoryError::MissingIdentifier)?;
        let collection = self.get_collection();
        let collection = collection.read().await;

        let metadata = collection
            .update_one(
                doc! {"_id": id},
                doc! {"$set": bson::to_document(&entity).map_err(|_| RepositoryError::BsonConversionError)?},
            )
            .await?;

        if metadata.matched_count > 0 {
            Ok(entity)
        } else {
            Err(RepositoryError::TargetNotFound)
        }
    }

    async fn delete_one(&self, id: ObjectId) -> Result<(), RepositoryError> {
        let collection = self.get_collection();
        let collection = collection.read().await;
        collection.delete_one(doc! {"_id": id}).await?;

        Ok(())
    }

    /// Deletes every entity matching the filter.
    async fn delete_all_by(&self, filter: BsonDocument) -> Result<(), RepositoryError> {
        let collection = self.get_collection();
        let collection = collection.read().await;
        collection.delete_many(filter).await?;

        Ok(())
    }
}

impl From<MongoError> for RepositoryError {
    fn from(error: MongoError) -> Self {
        RepositoryError::Generic(error.to_string())
    }
}
