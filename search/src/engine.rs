//! Autocomplete engine.

use crate::candidate::retrieve;
use crate::error::SearchError;
use crate::query::QueryProjections;
use crate::rank::rank;
use crate::results::AutocompleteItem;
use marquee_core::store::IndexStore;
use marquee_core::types::SearchConfig;
use std::sync::Arc;
use tracing::{debug, error};

/// Serves prefix autocomplete over an [`IndexStore`].
///
/// Holds no per-query state; every call re-reads the store.
pub struct SearchEngine<S> {
    store: Arc<S>,
    config: SearchConfig,
}

impl<S> Clone for SearchEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: IndexStore> SearchEngine<S> {
    pub fn new(store: Arc<S>, config: SearchConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns at most `limit` suggestions for `query`, best first.
    ///
    /// An empty query or a zero limit yields no results. Storage failures are
    /// returned as errors, never as an empty result.
    pub async fn autocomplete(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<AutocompleteItem>, SearchError> {
        let projections = QueryProjections::new(query);
        if limit == 0 || projections.is_empty() {
            return Ok(Vec::new());
        }

        debug!(query, limit, "autocomplete started");

        let candidates = retrieve(self.store.as_ref(), &projections, &self.config, limit)
            .await
            .map_err(|err| {
                error!(query, error = %err, "autocomplete candidate retrieval failed");
                SearchError::from(err)
            })?;

        if candidates.is_empty() {
            debug!(query, "autocomplete found no candidates");
            return Ok(Vec::new());
        }

        let items = rank(&candidates, &projections, &self.config, limit);

        debug!(
            query,
            candidates = candidates.len(),
            results = items.len(),
            "autocomplete finished"
        );
        Ok(items)
    }

    /// Resolves an optional caller limit against the configured default and
    /// cap, then runs [`autocomplete`](Self::autocomplete).
    pub async fn autocomplete_with_default(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<AutocompleteItem>, SearchError> {
        let limit = self.config.resolve_limit(limit);
        self.autocomplete(query, limit).await
    }
}
