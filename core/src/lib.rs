//! Search-key index for a movie catalog.
//!
//! - [`normalize`]: Hangul-aware text projections used for indexing and queries
//! - [`store`]: the persistent search index (redb)
//! - [`sync`]: keeps the index consistent with movie writes
//! - [`types`]: records, identifiers and configuration

pub mod normalize;
pub mod store;
pub mod sync;
pub mod types;

pub use store::{Association, IndexStore, RedbIndexStore, StorageError};
pub use sync::{IndexEvent, IndexSynchronizer, SyncHandle, SyncReport, spawn_sync_worker};
