//! Re-ranking of merged candidates.
//!
//! 1. Fuzzy stages, each anchored differently, fill the result list in order
//!    until `limit` distinct candidates are collected.
//! 2. Prefix bonuses are subtracted from the fuzzy scores.
//! 3. Candidates the fuzzy pass missed are backfilled with synthetic scores.
//! 4. Everything is sorted by score, source priority and display length.

use crate::candidate::{Candidate, MatchSource};
use crate::query::QueryProjections;
use crate::results::AutocompleteItem;
use crate::scorer::{Field, FieldQuery, FuzzyScorer};
use marquee_core::types::{BackfillScores, PrefixBonuses, SearchConfig};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scored {
    pub index: usize,
    pub score: f64,
}

pub(crate) fn rank(
    candidates: &[Candidate],
    query: &QueryProjections,
    config: &SearchConfig,
    limit: usize,
) -> Vec<AutocompleteItem> {
    if limit == 0 || candidates.is_empty() {
        return Vec::new();
    }

    let mut scorer = FuzzyScorer::new(config);
    let mut scored: Vec<Scored> = fuzzy_pass(&mut scorer, candidates, query, config, limit)
        .into_iter()
        .map(|(index, distance)| Scored {
            index,
            score: round4(apply_bonuses(
                distance,
                &candidates[index],
                query,
                &config.bonuses,
            )),
        })
        .collect();

    if scored.len() < limit {
        backfill(&mut scored, candidates, &config.backfill, limit);
    }

    sort_final(&mut scored, candidates);
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|Scored { index, score }| {
            let key = &candidates[index].key;
            AutocompleteItem {
                key: key.display_text.clone(),
                key_type: key.key_type,
                entity_ids: key.entity_ids.iter().cloned().collect(),
                score,
            }
        })
        .collect()
}

/// Runs the fuzzy stages in order, collecting up to `limit` distinct
/// candidates as `(index, distance)`.
fn fuzzy_pass(
    scorer: &mut FuzzyScorer,
    candidates: &[Candidate],
    query: &QueryProjections,
    config: &SearchConfig,
    limit: usize,
) -> Vec<(usize, f64)> {
    let jamo = query.jamo_at_least(config.min_jamo_len);
    let initials = query.initials_at_least(config.min_initials_len);

    let stages: Vec<Vec<FieldQuery>> = vec![
        scorer.prefix(Field::Normalized, &query.normalized).into_iter().collect(),
        jamo.and_then(|jamo| scorer.prefix(Field::Jamo, jamo))
            .into_iter()
            .collect(),
        initials
            .and_then(|initials| scorer.prefix(Field::Initials, initials))
            .into_iter()
            .collect(),
        scorer.prefix(Field::Display, &query.raw).into_iter().collect(),
        free_stage(scorer, query),
    ];

    let mut accepted = Vec::new();
    let mut seen = HashSet::new();

    for stage in &stages {
        if accepted.len() >= limit {
            break;
        }
        for (index, distance) in scorer.rank(stage, candidates) {
            if !seen.insert(index) {
                continue;
            }
            accepted.push((index, distance));
            if accepted.len() >= limit {
                break;
            }
        }
    }

    accepted
}

/// Unanchored stage over every field, each against its own projection.
fn free_stage(scorer: &mut FuzzyScorer, query: &QueryProjections) -> Vec<FieldQuery> {
    let mut queries = Vec::new();
    queries.extend(scorer.fuzzy(Field::Normalized, &query.normalized));
    queries.extend(scorer.fuzzy(Field::Jamo, &query.jamo));
    queries.extend(scorer.fuzzy(Field::Display, &query.raw));
    if let Some(initials) = query.initials.as_deref() {
        queries.extend(scorer.fuzzy(Field::Initials, initials));
    }
    queries
}

/// Subtracts every applicable prefix bonus, flooring at zero.
pub(crate) fn apply_bonuses(
    distance: f64,
    candidate: &Candidate,
    query: &QueryProjections,
    bonuses: &PrefixBonuses,
) -> f64 {
    let key = &candidate.key;
    let mut score = distance;

    if key.normalized_text.starts_with(&query.normalized) {
        score -= bonuses.normalized;
    }
    if !query.jamo.is_empty() && key.jamo_text.starts_with(&query.jamo) {
        score -= bonuses.jamo;
    }
    if let Some(initials) = query.initials.as_deref() {
        if !initials.is_empty() && key.initials_text.starts_with(initials) {
            score -= bonuses.initials;
        }
    }
    if key.display_text.starts_with(&query.raw) {
        score -= bonuses.display;
    }

    score.max(0.0)
}

/// Appends candidates not yet scored, best source first, until `limit`.
pub(crate) fn backfill(
    scored: &mut Vec<Scored>,
    candidates: &[Candidate],
    scores: &BackfillScores,
    limit: usize,
) {
    let taken: HashSet<usize> = scored.iter().map(|entry| entry.index).collect();

    let mut pending: Vec<Scored> = candidates
        .iter()
        .enumerate()
        .filter(|(index, _)| !taken.contains(index))
        .map(|(index, candidate)| Scored {
            index,
            score: round4(backfill_score(candidate.source, scores)),
        })
        .collect();

    pending.sort_by(|a, b| {
        let (ca, cb) = (&candidates[a.index], &candidates[b.index]);
        ca.source
            .rank()
            .cmp(&cb.source.rank())
            .then(a.score.total_cmp(&b.score))
            .then(ca.char_len().cmp(&cb.char_len()))
    });

    let room = limit.saturating_sub(scored.len());
    scored.extend(pending.into_iter().take(room));
}

/// Base score of the source plus a small per-source tie-breaker.
pub(crate) fn backfill_score(source: MatchSource, scores: &BackfillScores) -> f64 {
    match source {
        MatchSource::Normalized => scores.normalized + 0.0001,
        MatchSource::Jamo => scores.jamo + 0.0002,
        MatchSource::Initials => scores.initials + 0.0003,
        MatchSource::Display => scores.display + 0.0009,
        MatchSource::Other => scores.other + 0.0009,
    }
}

fn sort_final(scored: &mut [Scored], candidates: &[Candidate]) {
    scored.sort_by(|a, b| {
        let (ca, cb) = (&candidates[a.index], &candidates[b.index]);
        a.score
            .total_cmp(&b.score)
            .then(ca.source.rank().cmp(&cb.source.rank()))
            .then(ca.char_len().cmp(&cb.char_len()))
    });
}

pub(crate) fn round4(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests;
