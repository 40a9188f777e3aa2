use marquee_core::store::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Candidate retrieval failed. No partial result is returned.
    #[error("search failed: {0}")]
    Storage(#[from] StorageError),
}
