use crate::store::db::error::DatabaseError;
use crate::types::KeyId;
use redb::{
    MultimapTableDefinition, ReadTransaction, ReadableMultimapTable, WriteTransaction,
};

/// Secondary index from one derived text field to the records holding it.
///
/// Stores `term → KeyId` pairs in a multimap table. Terms are ordered
/// byte-wise, so every term sharing a prefix lies in one contiguous range.
pub struct FieldIndex {
    definition: MultimapTableDefinition<'static, &'static str, KeyId>,
}

impl FieldIndex {
    pub const fn new(name: &'static str) -> Self {
        Self {
            definition: MultimapTableDefinition::new(name),
        }
    }

    pub fn init(&self, txn: &WriteTransaction) -> Result<(), DatabaseError> {
        txn.open_multimap_table(self.definition)?;
        Ok(())
    }

    /// Empty terms are not indexed.
    pub fn insert(
        &self,
        txn: &WriteTransaction,
        term: &str,
        id: &KeyId,
    ) -> Result<(), DatabaseError> {
        if term.is_empty() {
            return Ok(());
        }
        let mut table = txn.open_multimap_table(self.definition)?;
        table.insert(term, id)?;
        Ok(())
    }

    /// Returns `true` if the entry was present.
    pub fn remove(
        &self,
        txn: &WriteTransaction,
        term: &str,
        id: &KeyId,
    ) -> Result<bool, DatabaseError> {
        if term.is_empty() {
            return Ok(false);
        }
        let mut table = txn.open_multimap_table(self.definition)?;
        Ok(table.remove(term, id)?)
    }

    /// Returns up to `cap` ids whose term starts with `prefix`, in term order.
    pub fn prefix_ids(
        &self,
        txn: &ReadTransaction,
        prefix: &str,
        cap: usize,
    ) -> Result<Vec<KeyId>, DatabaseError> {
        let table = txn.open_multimap_table(self.definition)?;
        let mut ids = Vec::new();

        if cap == 0 {
            return Ok(ids);
        }

        for entry in table.range(prefix..)? {
            let (term, values) = entry?;
            if !term.value().starts_with(prefix) {
                break;
            }

            for value in values {
                ids.push(value?.value());
                if ids.len() >= cap {
                    return Ok(ids);
                }
            }
        }

        Ok(ids)
    }
}
