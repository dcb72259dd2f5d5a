//! Concrete repositories for the hub entities.

use async_trait::async_trait;
use database::{Identifiable, Repository};
use mongodb::Collection;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::{CredentialResource, KeyPairResource, ParticipantContext};

pub const PARTICIPANT_COLLECTION: &str = "participant_contexts";
pub const KEYPAIR_COLLECTION: &str = "keypair_resources";
pub const CREDENTIAL_COLLECTION: &str = "credential_resources";

/// A repository over a named collection of the shared database.
#[derive(Debug, Clone)]
pub struct MongoRepository<T>
where
    T: Sized + Clone + Send + Sync + 'static,
    T: Identifiable + Unpin,
    T: Serialize + DeserializeOwned,
{
    collection: Collection<T>,
}

impl<T> MongoRepository<T>
where
    T: Sized + Clone + Send + Sync + 'static,
    T: Identifiable + Unpin,
    T: Serialize + DeserializeOwned,
{
    pub fn new(collection_name: &str) -> Self {
        let db = database::get_or_init_database();
        let collection = tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let db_lock = db.write().await;
                db_lock.collection(collection_name).clone()
            })
        });

        Self { collection }
    }
}

#[async_trait]
impl<T> Repository<T> for MongoRepository<T>
where
    T: Sized + Clone + Send + Sync + 'static,
    T: Identifiable + Unpin,
    T: Serialize + DeserializeOwned,
{
    fn get_collection(&self) -> Arc<RwLock<Collection<T>>> {
        Arc::new(RwLock::new(self.collection.clone()))
    }
}

/// Convenience constructors for the three hub collections.
pub fn participant_repository() -> Arc<dyn Repository<ParticipantContext>> {
    Arc::new(MongoRepository::new(PARTICIPANT_COLLECTION))
}

pub fn keypair_repository() -> Arc<dyn Repository<KeyPairResource>> {
    Arc::new(MongoRepository::new(KEYPAIR_COLLECTION))
}

pub fn credential_repository() -> Arc<dyn Repository<CredentialResource>> {
    Arc::new(MongoRepository::new(CREDENTIAL_COLLECTION))
}

#[cfg(any(test, feature = "test-utils"))]
pub mod tests {
    //! In-memory repository emulating the subset of MongoDB filter
    //! semantics the services rely on: equality on dotted paths, with
    //! array-contains behavior on array leaves.

    use super::*;
    use database::RepositoryError;
    use mongodb::bson::{oid::ObjectId, Document as BsonDocument};
    use serde_json::Value;
    use std::sync::RwLock as StdRwLock;

    #[derive(Default)]
    pub struct MockRepository<T> {
        entities: StdRwLock<Vec<T>>,
    }

    impl<T: Clone> MockRepository<T> {
        pub fn new(entities: Vec<T>) -> Self {
            Self {
                entities: StdRwLock::new(entities),
            }
        }
    }

    fn lookup<'a>(value: &'a Value, path: &[&str]) -> Vec<&'a Value> {
        if path.is_empty() {
            return vec![value];
        }
        match value {
            Value::Object(map) => map
                .get(path[0])
                .map(|v| lookup(v, &path[1..]))
                .unwrap_or_default(),
            Value::Array(items) => items.iter().flat_map(|v| lookup(v, path)).collect(),
            _ => vec![],
        }
    }

    fn matches<T: Serialize>(entity: &T, filter: &BsonDocument) -> bool {
        let entity = serde_json::to_value(entity).expect("entity must serialize");

        filter.iter().all(|(key, expected)| {
            let expected = serde_json::to_value(expected.clone()).unwrap_or(Value::Null);
            let path: Vec<&str> = key.split('.').collect();
            lookup(&entity, &path).iter().any(|found| match found {
                Value::Array(items) => items.contains(&expected) || **found == expected,
                other => **other == expected,
            })
        })
    }

    #[async_trait]
    impl<T> Repository<T> for MockRepository<T>
    where
        T: Sized + Clone + Send + Sync + 'static,
        T: Identifiable + Unpin,
        T: Serialize + DeserializeOwned,
    {
        fn get_collection(&self) -> Arc<RwLock<Collection<T>>> {
            unimplemented!("in-memory repository has no backing collection")
        }

        async fn find_all(&self) -> Result<Vec<T>, RepositoryError> {
            Ok(self.entities.read().unwrap().clone())
        }

        async fn count_by(&self, filter: BsonDocument) -> Result<usize, RepositoryError> {
            Ok(self
                .entities
                .read()
                .unwrap()
                .iter()
                .filter(|e| matches(*e, &filter))
                .count())
        }

        async fn find_one_by(&self, filter: BsonDocument) -> Result<Option<T>, RepositoryError> {
            Ok(self
                .entities
                .read()
                .unwrap()
                .iter()
                .find(|e| matches(*e, &filter))
                .cloned())
        }

        async fn find_all_by(
            &self,
            filter: BsonDocument,
            limit: Option<i64>,
        ) -> Result<Vec<T>, RepositoryError> {
            let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
            Ok(self
                .entities
                .read()
                .unwrap()
                .iter()
                .filter(|e| matches(*e, &filter))
                .take(limit)
                .cloned()
                .collect())
        }

        async fn store(&self, mut entity: T) -> Result<T, RepositoryError> {
            if entity.id().is_none() {
                entity.set_id(ObjectId::new());
            }
            self.entities.write().unwrap().push(entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: T) -> Result<T, RepositoryError> {
            let id = entity.id().ok_or(RepositoryError::MissingIdentifier)?;
            let mut entities = self.entities.write().unwrap();
            let position = entities
                .iter()
                .position(|e| e.id() == Some(id))
                .ok_or(RepositoryError::TargetNotFound)?;
            entities[position] = entity.clone();
            Ok(entity)
        }

        async fn delete_one(&self, id: ObjectId) -> Result<(), RepositoryError> {
            let mut entities = self.entities.write().unwrap();
            entities.retain(|e| e.id() != Some(id));
            Ok(())
        }

        async fn delete_all_by(&self, filter: BsonDocument) -> Result<(), RepositoryError> {
            let mut entities = self.entities.write().unwrap();
            entities.retain(|e| !matches(e, &filter));
            Ok(())
        }
    }

}
