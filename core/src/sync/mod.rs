//! Index Synchronizer.
//!
//! Keeps the search index in step with movie writes. Every operation is
//! best-effort: store failures are logged and counted in the returned report,
//! never returned as errors, so an index problem cannot fail the movie write
//! that triggered it.

use crate::store::{Association, IndexStore};
use crate::types::{EntityId, KeyType, Movie};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

mod worker;

pub use worker::{IndexEvent, SyncHandle, spawn_sync_worker};

/// Associations written per transaction during a rebuild.
const REBUILD_BATCH_SIZE: usize = 1024;

/// Returns the `(key type, display text)` pairs a movie contributes to the
/// index: its title, its director and each cast member's name.
///
/// Blank fields are skipped, text is trimmed and duplicates collapse to the
/// first occurrence.
pub fn extract_keys(movie: &Movie) -> Vec<(KeyType, String)> {
    let title = std::iter::once((KeyType::Movie, movie.title.as_str()));
    let director = movie
        .director
        .as_deref()
        .map(|director| (KeyType::Director, director));
    let cast = movie
        .cast
        .iter()
        .map(|member| (KeyType::Actor, member.name.as_str()));

    let mut seen = HashSet::new();
    title
        .chain(director)
        .chain(cast)
        .filter_map(|(key_type, text)| {
            let text = text.trim();
            (!text.is_empty()).then(|| (key_type, text.to_string()))
        })
        .filter(|pair| seen.insert(pair.clone()))
        .collect()
}

/// Outcome of one synchronizer call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub upserted: usize,
    pub removed: usize,
    pub orphans_deleted: usize,
    /// Store calls that failed and were skipped.
    pub failures: usize,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failures == 0
    }
}

/// Outcome of a full rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub movies: usize,
    /// Distinct `(text, type)` keys derived from the movies.
    pub keys: usize,
    /// Associations that were not already present.
    pub associations: usize,
    pub failed_batches: usize,
}

pub struct IndexSynchronizer<S> {
    store: Arc<S>,
}

impl<S> Clone for IndexSynchronizer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: IndexStore> IndexSynchronizer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Associates every key of a newly written movie.
    pub async fn sync_on_create(&self, movie: &Movie) -> SyncReport {
        let mut report = SyncReport::default();
        self.upsert_all(movie, "create", &mut report).await;
        debug!(entity_id = %movie.id, ?report, "synced created movie");
        report
    }

    /// Moves associations from `previous` to `current`.
    ///
    /// Runs strictly in order: remove every old key, upsert every new key,
    /// then sweep orphans. A key present in both versions is therefore never
    /// deleted, and a key dropped by the update is swept in the same call.
    pub async fn sync_on_update(&self, previous: &Movie, current: &Movie) -> SyncReport {
        let mut report = SyncReport::default();
        self.remove_all(previous, "update", &mut report).await;
        self.upsert_all(current, "update", &mut report).await;
        self.delete_orphans(&current.id, "update", &mut report).await;
        debug!(entity_id = %current.id, ?report, "synced updated movie");
        report
    }

    /// Dissociates every key of a deleted movie and sweeps orphans.
    pub async fn sync_on_delete(&self, movie: &Movie) -> SyncReport {
        let mut report = SyncReport::default();
        self.remove_all(movie, "delete", &mut report).await;
        self.delete_orphans(&movie.id, "delete", &mut report).await;
        debug!(entity_id = %movie.id, ?report, "synced deleted movie");
        report
    }

    /// Deletes orphaned keys; returns how many were deleted. Failures are
    /// logged and reported as zero.
    pub async fn sweep_orphans(&self) -> usize {
        match self.store.delete_orphans().await {
            Ok(deleted) => {
                if deleted > 0 {
                    info!(deleted, "swept orphaned search keys");
                }
                deleted
            }
            Err(error) => {
                warn!(op = "sweep", %error, "orphan sweep failed");
                0
            }
        }
    }

    /// Associates every key of every movie, batching writes.
    ///
    /// Existing associations are kept; nothing is removed.
    pub async fn rebuild(&self, movies: &[Movie]) -> RebuildReport {
        let mut report = RebuildReport {
            movies: movies.len(),
            ..RebuildReport::default()
        };

        let associations: Vec<Association> = movies
            .iter()
            .flat_map(|movie| {
                extract_keys(movie).into_iter().map(|(key_type, text)| {
                    Association::new(text, key_type, movie.id.clone())
                })
            })
            .collect();

        report.keys = associations
            .iter()
            .map(|association| &association.key)
            .collect::<BTreeSet<_>>()
            .len();

        for batch in associations.chunks(REBUILD_BATCH_SIZE) {
            match self.store.bulk_upsert(batch.to_vec()).await {
                Ok(added) => report.associations += added,
                Err(error) => {
                    warn!(op = "rebuild", batch_len = batch.len(), %error, "search index rebuild batch failed");
                    report.failed_batches += 1;
                }
            }
        }

        info!(
            movies = report.movies,
            keys = report.keys,
            associations = report.associations,
            failed_batches = report.failed_batches,
            "rebuilt search index"
        );
        report
    }

    async fn upsert_all(&self, movie: &Movie, op: &'static str, report: &mut SyncReport) {
        for (key_type, text) in extract_keys(movie) {
            match self
                .store
                .upsert_association(&text, key_type, &movie.id)
                .await
            {
                Ok(()) => report.upserted += 1,
                Err(error) => {
                    warn!(entity_id = %movie.id, op, key = %text, %key_type, %error, "search key upsert failed");
                    report.failures += 1;
                }
            }
        }
    }

    async fn remove_all(&self, movie: &Movie, op: &'static str, report: &mut SyncReport) {
        for (key_type, text) in extract_keys(movie) {
            match self
                .store
                .remove_association(&text, key_type, &movie.id)
                .await
            {
                Ok(()) => report.removed += 1,
                Err(error) => {
                    warn!(entity_id = %movie.id, op, key = %text, %key_type, %error, "search key removal failed");
                    report.failures += 1;
                }
            }
        }
    }

    async fn delete_orphans(&self, entity_id: &EntityId, op: &'static str, report: &mut SyncReport) {
        match self.store.delete_orphans().await {
            Ok(deleted) => report.orphans_deleted += deleted,
            Err(error) => {
                warn!(%entity_id, op, %error, "orphan cleanup failed");
                report.failures += 1;
            }
        }
    }
}
