use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::RecordVariant;
use crate::types::{EntityId, KeyType};

#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchKeyRecord {
    pub display_text: String,
    pub key_type: KeyType,
    pub normalized_text: String,
    pub jamo_text: String,
    pub initials_text: String,
    pub entity_ids: BTreeSet<EntityId>,
}

impl RecordVariant for SearchKeyRecord {
    const VERSION: u8 = 1;
}
