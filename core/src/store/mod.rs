//! Search Index Store.
//!
//! [`IndexStore`] is the storage seam used by the synchronizer and the
//! autocomplete engine. [`RedbIndexStore`] implements it on top of a redb
//! file, running each call on the blocking thread pool.

use crate::store::db::Database;
use crate::store::db::error::DatabaseError;
use crate::types::{Config, EntityId, IndexedField, KeyId, KeyType, SearchKey};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

pub mod db;

/// Failure of an index store operation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// One `(display text, key type) → entity` reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Association {
    pub key: KeyId,
    pub entity_id: EntityId,
}

impl Association {
    pub fn new(display_text: impl Into<String>, key_type: KeyType, entity_id: EntityId) -> Self {
        Self {
            key: KeyId::new(display_text, key_type),
            entity_id,
        }
    }
}

/// Persistent collection of search keys with prefix lookups on each derived
/// field.
///
/// All writes are idempotent and safe to retry.
pub trait IndexStore: Send + Sync + 'static {
    /// Returns up to `cap` records whose `field` starts with `prefix`, in no
    /// particular ranking order.
    fn find_by_prefix(
        &self,
        field: IndexedField,
        prefix: &str,
        cap: usize,
    ) -> impl Future<Output = Result<Vec<SearchKey>, StorageError>> + Send;

    /// Ensures a record for `(display_text, key_type)` exists and references
    /// `entity_id`.
    fn upsert_association(
        &self,
        display_text: &str,
        key_type: KeyType,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes `entity_id` from the record if present. Never deletes the
    /// record.
    fn remove_association(
        &self,
        display_text: &str,
        key_type: KeyType,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Deletes every record whose entity set is empty; returns how many were
    /// deleted.
    fn delete_orphans(&self) -> impl Future<Output = Result<usize, StorageError>> + Send;

    /// Applies many upserts at once; returns the number of new associations.
    fn bulk_upsert(
        &self,
        associations: Vec<Association>,
    ) -> impl Future<Output = Result<usize, StorageError>> + Send;

    fn get(
        &self,
        display_text: &str,
        key_type: KeyType,
    ) -> impl Future<Output = Result<Option<SearchKey>, StorageError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, StorageError>> + Send;
}

/// redb-backed [`IndexStore`]. Cheap to clone.
#[derive(Clone)]
pub struct RedbIndexStore {
    db: Arc<Database>,
}

impl RedbIndexStore {
    /// Opens or creates the index at `config.db_path()`.
    pub fn open(config: Config) -> Result<Self, StorageError> {
        let db = Database::new(config)?;
        Ok(Self { db: Arc::new(db) })
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, DatabaseError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || op(&db)).await?;
        Ok(result?)
    }
}

impl IndexStore for RedbIndexStore {
    async fn find_by_prefix(
        &self,
        field: IndexedField,
        prefix: &str,
        cap: usize,
    ) -> Result<Vec<SearchKey>, StorageError> {
        let prefix = prefix.to_owned();
        self.run(move |db| db.find_by_prefix(field, &prefix, cap))
            .await
    }

    async fn upsert_association(
        &self,
        display_text: &str,
        key_type: KeyType,
        entity_id: &EntityId,
    ) -> Result<(), StorageError> {
        let id = KeyId::new(display_text, key_type);
        let entity_id = entity_id.clone();
        self.run(move |db| db.upsert_association(&id, &entity_id).map(|_| ()))
            .await
    }

    async fn remove_association(
        &self,
        display_text: &str,
        key_type: KeyType,
        entity_id: &EntityId,
    ) -> Result<(), StorageError> {
        let id = KeyId::new(display_text, key_type);
        let entity_id = entity_id.clone();
        self.run(move |db| db.remove_association(&id, &entity_id).map(|_| ()))
            .await
    }

    async fn delete_orphans(&self) -> Result<usize, StorageError> {
        self.run(|db| db.delete_orphans()).await
    }

    async fn bulk_upsert(&self, associations: Vec<Association>) -> Result<usize, StorageError> {
        self.run(move |db| {
            db.bulk_upsert(
                associations
                    .iter()
                    .map(|association| (&association.key, &association.entity_id)),
            )
        })
        .await
    }

    async fn get(
        &self,
        display_text: &str,
        key_type: KeyType,
    ) -> Result<Option<SearchKey>, StorageError> {
        let id = KeyId::new(display_text.trim(), key_type);
        self.run(move |db| db.get(&id)).await
    }

    async fn count(&self) -> Result<u64, StorageError> {
        self.run(|db| db.count()).await
    }
}
