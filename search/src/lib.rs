//! Marquee autocomplete.
//!
//! Given a partial query, finds search keys whose normalized, jamo or
//! initials projection starts with the query's matching projection, then
//! re-ranks them with nucleo.
//!
//! # Pipeline
//!
//! - Project the query (`normalize`, full jamo, initials when Hangul).
//! - Fetch prefix candidates from the three field indexes concurrently and
//!   merge them, keeping the strongest match source per key.
//! - Fuzzy-score the candidates in anchored stages, apply prefix bonuses,
//!   backfill whatever the fuzzy pass missed and sort.

mod candidate;
mod engine;
mod error;
mod query;
mod rank;
mod results;
mod scorer;

pub use engine::SearchEngine;
pub use error::SearchError;
pub use results::AutocompleteItem;

pub use marquee_core::types::{CaseMatching, SearchConfig};

#[cfg(test)]
mod tests;
