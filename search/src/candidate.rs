//! Prefix retrieval and merging of candidates from the three field indexes.

use crate::query::QueryProjections;
use marquee_core::store::{IndexStore, StorageError};
use marquee_core::types::{IndexedField, KeyType, SearchConfig, SearchKey};
use std::collections::HashSet;

/// Strongest field through which a candidate prefix-matches the query.
///
/// Declaration order is priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchSource {
    Normalized,
    Jamo,
    Initials,
    Display,
    Other,
}

impl MatchSource {
    pub(crate) fn rank(self) -> u8 {
        match self {
            MatchSource::Normalized => 0,
            MatchSource::Jamo => 1,
            MatchSource::Initials => 2,
            MatchSource::Display => 3,
            MatchSource::Other => 9,
        }
    }

    pub(crate) fn of(key: &SearchKey, query: &QueryProjections, min_initials_len: usize) -> Self {
        if key.normalized_text.starts_with(&query.normalized) {
            MatchSource::Normalized
        } else if !query.jamo.is_empty() && key.jamo_text.starts_with(&query.jamo) {
            MatchSource::Jamo
        } else if query
            .initials_at_least(min_initials_len)
            .is_some_and(|initials| key.initials_text.starts_with(initials))
        {
            MatchSource::Initials
        } else if key.display_text.starts_with(&query.raw) {
            MatchSource::Display
        } else {
            MatchSource::Other
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub key: SearchKey,
    pub source: MatchSource,
}

impl Candidate {
    pub fn char_len(&self) -> usize {
        self.key.display_text.chars().count()
    }
}

/// Runs the prefix lookups concurrently and merges them.
pub(crate) async fn retrieve<S: IndexStore>(
    store: &S,
    query: &QueryProjections,
    config: &SearchConfig,
    limit: usize,
) -> Result<Vec<Candidate>, StorageError> {
    let cap = config.candidate_cap(limit);
    let jamo = query.jamo_at_least(config.min_jamo_len);
    let initials = query.initials_at_least(config.min_initials_len);

    let (by_normalized, by_jamo, by_initials) = tokio::try_join!(
        store.find_by_prefix(IndexedField::Normalized, &query.normalized, cap),
        async {
            match jamo {
                Some(jamo) => store.find_by_prefix(IndexedField::Jamo, jamo, cap).await,
                None => Ok(Vec::new()),
            }
        },
        async {
            match initials {
                Some(initials) => {
                    store
                        .find_by_prefix(IndexedField::Initials, initials, cap)
                        .await
                }
                None => Ok(Vec::new()),
            }
        },
    )?;

    Ok(merge(
        [by_normalized, by_jamo, by_initials],
        query,
        config.min_initials_len,
    ))
}

/// Concatenates the lookups in priority order (normalized, jamo, initials),
/// keeping the first copy of each `(key type, display text)` and tagging it
/// with its strongest match source.
pub(crate) fn merge(
    batches: [Vec<SearchKey>; 3],
    query: &QueryProjections,
    min_initials_len: usize,
) -> Vec<Candidate> {
    let mut seen: HashSet<(KeyType, String)> = HashSet::new();
    let mut merged = Vec::new();

    for key in batches.into_iter().flatten() {
        if !seen.insert((key.key_type, key.display_text.clone())) {
            continue;
        }
        let source = MatchSource::of(&key, query, min_initials_len);
        merged.push(Candidate { key, source });
    }

    merged
}
