use marquee_core::types::{EntityId, KeyType};
use serde::Serialize;

/// One autocomplete suggestion. Lower `score` is better.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteItem {
    pub key: String,
    pub key_type: KeyType,
    #[serde(rename = "movieIds")]
    pub entity_ids: Vec<EntityId>,
    pub score: f64,
}
