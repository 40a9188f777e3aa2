mod app;
mod core;
mod search;
mod sync;

pub use app::{AppConfig, AppConfigError};
pub use core::Config;
pub use search::{BackfillScores, CaseMatching, FieldWeights, PrefixBonuses, SearchConfig};
pub use sync::SyncConfig;
