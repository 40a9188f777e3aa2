pub(crate) mod config;
pub use config::{
    AppConfig, AppConfigError, BackfillScores, CaseMatching, Config, FieldWeights, PrefixBonuses,
    SearchConfig, SyncConfig,
};

pub(crate) mod entity_id;
pub use entity_id::{EntityId, MAX_ENTITY_ID_LENGTH};

pub(crate) mod key_type;
pub use key_type::KeyType;

pub(crate) mod key_id;
pub use key_id::KeyId;

pub(crate) mod search_key;
pub use search_key::{IndexedField, SearchKey};

pub(crate) mod movie;
pub use movie::{CastMember, Movie};
