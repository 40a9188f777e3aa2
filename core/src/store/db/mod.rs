//! redb layer of the search index.
//!
//! Tables:
//! - main: `KeyId → VersionedSearchKey`
//! - orphans: `KeyId → ()`, records whose entity set became empty
//! - one prefix index per derived field: `term → KeyId` (multimap)

use crate::store::db::error::DatabaseError;
use crate::store::db::field_index::FieldIndex;
use crate::types::search_key::versioned::VersionedSearchKey;
use crate::types::{Config, EntityId, IndexedField, KeyId, SearchKey};
use redb::{ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition, WriteTransaction};

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DatabaseError {
        #[error("Database error: {0}")]
        Redb(#[from] redb::DatabaseError),

        #[error("Table error: {0}")]
        TableError(#[from] redb::TableError),

        #[error("Storage error: {0}")]
        StorageError(#[from] redb::StorageError),

        #[error("Transaction error: {0}")]
        TransactionError(#[from] redb::TransactionError),

        #[error("Commit error: {0}")]
        CommitError(#[from] redb::CommitError),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Invalid search key: {0}")]
        InvalidKey(String),
    }
}

mod field_index;

/// Main table: KeyId → VersionedSearchKey
const MAIN_TABLE: TableDefinition<KeyId, VersionedSearchKey> = TableDefinition::new("search_keys");

/// Records waiting for the next orphan sweep.
const ORPHAN_TABLE: TableDefinition<KeyId, ()> = TableDefinition::new("orphans");

const NORMALIZED_INDEX: FieldIndex = FieldIndex::new("idx_normalized");
const JAMO_INDEX: FieldIndex = FieldIndex::new("idx_jamo");
const INITIALS_INDEX: FieldIndex = FieldIndex::new("idx_initials");

fn field_index(field: IndexedField) -> &'static FieldIndex {
    match field {
        IndexedField::Normalized => &NORMALIZED_INDEX,
        IndexedField::Jamo => &JAMO_INDEX,
        IndexedField::Initials => &INITIALS_INDEX,
    }
}

/// The search index database wrapping redb.
///
/// Every write runs in a single redb write transaction, so concurrent callers
/// are serialized by redb and never overwrite each other's entity sets.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Creates or opens a database using paths from the config.
    pub fn new(config: Config) -> Result<Self, DatabaseError> {
        std::fs::create_dir_all(&config.base_path)?;

        let db = redb::Database::create(config.db_path())?;

        // Initialize tables
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(MAIN_TABLE)?;
            let _ = write_txn.open_table(ORPHAN_TABLE)?;
            for field in IndexedField::ALL {
                field_index(field).init(&write_txn)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

/// Read operations.
impl Database {
    /// Retrieves a record by its natural key.
    pub fn get(&self, id: &KeyId) -> Result<Option<SearchKey>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MAIN_TABLE)?;

        match table.get(id)? {
            None => Ok(None),
            Some(guard) => Ok(Some(Self::extract_latest(guard.value()))),
        }
    }

    /// Returns up to `cap` records whose `field` starts with `prefix`.
    pub fn find_by_prefix(
        &self,
        field: IndexedField,
        prefix: &str,
        cap: usize,
    ) -> Result<Vec<SearchKey>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let ids = field_index(field).prefix_ids(&read_txn, prefix, cap)?;
        let table = read_txn.open_table(MAIN_TABLE)?;

        let mut keys = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(guard) = table.get(&id)? {
                keys.push(Self::extract_latest(guard.value()));
            }
        }

        Ok(keys)
    }

    /// Number of records, orphans included.
    pub fn count(&self) -> Result<u64, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MAIN_TABLE)?;
        Ok(table.len()?)
    }

    /// Ids of records currently marked as orphaned.
    pub fn orphan_ids(&self) -> Result<Vec<KeyId>, DatabaseError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORPHAN_TABLE)?;

        let mut ids = Vec::new();
        for entry in table.iter()? {
            let (id, _) = entry?;
            ids.push(id.value());
        }

        Ok(ids)
    }
}

/// Write operations.
impl Database {
    /// Ensures the record for `id` exists with current derived fields and
    /// references `entity_id`.
    ///
    /// Returns `true` if `entity_id` was newly added.
    pub fn upsert_association(
        &self,
        id: &KeyId,
        entity_id: &EntityId,
    ) -> Result<bool, DatabaseError> {
        let id = Self::validate_id(id)?;
        let write_txn = self.db.begin_write()?;
        let added = Self::upsert_in(&write_txn, &id, entity_id)?;
        write_txn.commit()?;
        Ok(added)
    }

    /// Applies many associations in one transaction.
    ///
    /// Returns the number of newly added associations. Fails without writing
    /// anything if any display text is blank.
    pub fn bulk_upsert<'a, I>(&self, associations: I) -> Result<usize, DatabaseError>
    where
        I: IntoIterator<Item = (&'a KeyId, &'a EntityId)>,
    {
        let write_txn = self.db.begin_write()?;
        let mut added = 0;

        for (id, entity_id) in associations {
            let id = Self::validate_id(id)?;
            if Self::upsert_in(&write_txn, &id, entity_id)? {
                added += 1;
            }
        }

        write_txn.commit()?;
        Ok(added)
    }

    /// Removes `entity_id` from the record for `id`. The record is kept; if its
    /// entity set becomes empty it is marked as orphaned.
    ///
    /// Returns `true` if `entity_id` was present.
    pub fn remove_association(
        &self,
        id: &KeyId,
        entity_id: &EntityId,
    ) -> Result<bool, DatabaseError> {
        let id = Self::validate_id(id)?;
        let write_txn = self.db.begin_write()?;

        {
            let mut main_table = write_txn.open_table(MAIN_TABLE)?;

            let Some(mut key) = main_table
                .get(&id)?
                .map(|g| Self::extract_latest(g.value()))
            else {
                return Ok(false);
            };

            if !key.entity_ids.remove(entity_id) {
                return Ok(false);
            }

            main_table.insert(&id, &VersionedSearchKey::V1(key.to_latest()))?;

            if key.is_orphaned() {
                let mut orphan_table = write_txn.open_table(ORPHAN_TABLE)?;
                orphan_table.insert(&id, &())?;
            }
        }

        write_txn.commit()?;
        Ok(true)
    }

    /// Deletes every orphaned record and its index entries.
    ///
    /// Each candidate is re-checked inside the transaction, so a record that
    /// gained an entity since it was orphaned survives. Returns the number of
    /// deleted records.
    pub fn delete_orphans(&self) -> Result<usize, DatabaseError> {
        let write_txn = self.db.begin_write()?;
        let mut deleted = 0;

        {
            let orphans: Vec<KeyId> = {
                let orphan_table = write_txn.open_table(ORPHAN_TABLE)?;
                let mut ids = Vec::new();
                for entry in orphan_table.iter()? {
                    let (id, _) = entry?;
                    ids.push(id.value());
                }
                ids
            };

            let mut main_table = write_txn.open_table(MAIN_TABLE)?;

            for id in &orphans {
                let record = main_table
                    .get(id)?
                    .map(|g| Self::extract_latest(g.value()));

                if let Some(key) = record {
                    if key.is_orphaned() {
                        Self::unindex(&write_txn, &key)?;
                        main_table.remove(id)?;
                        deleted += 1;
                    }
                }
            }

            let mut orphan_table = write_txn.open_table(ORPHAN_TABLE)?;
            for id in &orphans {
                orphan_table.remove(id)?;
            }
        }

        write_txn.commit()?;
        Ok(deleted)
    }
}

/// Helpers.
impl Database {
    fn extract_latest(versioned: VersionedSearchKey) -> SearchKey {
        SearchKey::from_latest(versioned.into_latest())
    }

    /// Trims the display text; blank text cannot identify a record.
    fn validate_id(id: &KeyId) -> Result<KeyId, DatabaseError> {
        let display_text = id.display_text.trim();
        if display_text.is_empty() {
            return Err(DatabaseError::InvalidKey(id.to_string()));
        }
        Ok(KeyId::new(display_text, id.key_type))
    }

    fn upsert_in(
        txn: &WriteTransaction,
        id: &KeyId,
        entity_id: &EntityId,
    ) -> Result<bool, DatabaseError> {
        let mut main_table = txn.open_table(MAIN_TABLE)?;

        let existing = main_table
            .get(id)?
            .map(|g| Self::extract_latest(g.value()));

        let mut dirty = false;
        let mut key = match existing {
            Some(mut key) => {
                if !key.has_current_fields() {
                    Self::unindex(txn, &key)?;
                    key.refresh_fields();
                    Self::index(txn, &key)?;
                    dirty = true;
                }
                key
            }
            None => {
                let key = SearchKey::new(id.display_text.clone(), id.key_type);
                Self::index(txn, &key)?;
                dirty = true;
                key
            }
        };

        let added = key.entity_ids.insert(entity_id.clone());
        if added || dirty {
            main_table.insert(id, &VersionedSearchKey::V1(key.to_latest()))?;
        }

        if added {
            let mut orphan_table = txn.open_table(ORPHAN_TABLE)?;
            orphan_table.remove(id)?;
        }

        Ok(added)
    }

    fn index(txn: &WriteTransaction, key: &SearchKey) -> Result<(), DatabaseError> {
        let id = key.id();
        for field in IndexedField::ALL {
            field_index(field).insert(txn, key.field(field), &id)?;
        }
        Ok(())
    }

    fn unindex(txn: &WriteTransaction, key: &SearchKey) -> Result<(), DatabaseError> {
        let id = key.id();
        for field in IndexedField::ALL {
            field_index(field).remove(txn, key.field(field), &id)?;
        }
        Ok(())
    }
}
