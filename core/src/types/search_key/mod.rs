//! Search key records.
//!
//! The public `SearchKey` is exported from `marquee_core::types`; the stored
//! form lives in `versioned`.

use crate::normalize::{normalize, to_full_jamo, to_initials};
use crate::types::{EntityId, KeyId, KeyType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub(crate) mod versioned;

use versioned::latest;

/// Derived text field that carries its own prefix index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexedField {
    Normalized,
    Jamo,
    Initials,
}

impl IndexedField {
    pub const ALL: [IndexedField; 3] = [
        IndexedField::Normalized,
        IndexedField::Jamo,
        IndexedField::Initials,
    ];
}

impl fmt::Display for IndexedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexedField::Normalized => write!(f, "normalized"),
            IndexedField::Jamo => write!(f, "jamo"),
            IndexedField::Initials => write!(f, "initials"),
        }
    }
}

/// One entry of the search index.
///
/// Unique by `(display_text, key_type)`. A key whose `entity_ids` is empty is
/// orphaned and will be removed by the next orphan sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchKey {
    pub display_text: String,
    pub key_type: KeyType,
    pub normalized_text: String,
    pub jamo_text: String,
    pub initials_text: String,
    pub entity_ids: BTreeSet<EntityId>,
}

impl SearchKey {
    /// Creates a key with derived fields computed from `display_text` and no
    /// entity references.
    pub fn new(display_text: impl Into<String>, key_type: KeyType) -> Self {
        let display_text = display_text.into();
        let (normalized_text, jamo_text, initials_text) = DerivedFields::of(&display_text).into();

        Self {
            display_text,
            key_type,
            normalized_text,
            jamo_text,
            initials_text,
            entity_ids: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> KeyId {
        KeyId::new(self.display_text.clone(), self.key_type)
    }

    pub fn field(&self, field: IndexedField) -> &str {
        match field {
            IndexedField::Normalized => &self.normalized_text,
            IndexedField::Jamo => &self.jamo_text,
            IndexedField::Initials => &self.initials_text,
        }
    }

    pub fn is_orphaned(&self) -> bool {
        self.entity_ids.is_empty()
    }

    /// Returns true if the stored derived fields match what the normalizer
    /// produces for `display_text` today.
    pub(crate) fn has_current_fields(&self) -> bool {
        let current = DerivedFields::of(&self.display_text);
        self.normalized_text == current.normalized
            && self.jamo_text == current.jamo
            && self.initials_text == current.initials
    }

    /// Recomputes the derived fields in place.
    pub(crate) fn refresh_fields(&mut self) {
        let (normalized_text, jamo_text, initials_text) =
            DerivedFields::of(&self.display_text).into();
        self.normalized_text = normalized_text;
        self.jamo_text = jamo_text;
        self.initials_text = initials_text;
    }

    pub(crate) fn from_latest(record: latest::SearchKeyRecord) -> Self {
        Self {
            display_text: record.display_text,
            key_type: record.key_type,
            normalized_text: record.normalized_text,
            jamo_text: record.jamo_text,
            initials_text: record.initials_text,
            entity_ids: record.entity_ids,
        }
    }

    pub(crate) fn to_latest(&self) -> latest::SearchKeyRecord {
        latest::SearchKeyRecord {
            display_text: self.display_text.clone(),
            key_type: self.key_type,
            normalized_text: self.normalized_text.clone(),
            jamo_text: self.jamo_text.clone(),
            initials_text: self.initials_text.clone(),
            entity_ids: self.entity_ids.clone(),
        }
    }
}

struct DerivedFields {
    normalized: String,
    jamo: String,
    initials: String,
}

impl DerivedFields {
    fn of(display_text: &str) -> Self {
        Self {
            normalized: normalize(display_text),
            jamo: to_full_jamo(display_text),
            initials: to_initials(display_text),
        }
    }
}

impl From<DerivedFields> for (String, String, String) {
    fn from(fields: DerivedFields) -> Self {
        (fields.normalized, fields.jamo, fields.initials)
    }
}
