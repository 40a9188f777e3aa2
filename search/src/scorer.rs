//! Weighted multi-field fuzzy scoring on top of nucleo.
//!
//! Nucleo scores grow with match quality. Each field score is turned into a
//! distance in `0.0..=1.0` (0 = exact) relative to the score the pattern gets
//! against its own needle, plus a penalty for how late the match starts.
//! Field distances combine as a weighted geometric product, so a strong match
//! on a heavy field dominates.

use crate::candidate::Candidate;
use marquee_core::normalize::escape_for_prefix_match;
use marquee_core::types::{CaseMatching, FieldWeights, SearchConfig, SearchKey};
use nucleo::pattern::{AtomKind, CaseMatching as NucleoCaseMatching, Normalization, Pattern};
use nucleo::{Config as NucleoConfig, Matcher, Utf32Str};

/// Text field of a search key that a pattern is run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Normalized,
    Jamo,
    Display,
    Initials,
}

impl Field {
    fn text(self, key: &SearchKey) -> &str {
        match self {
            Field::Normalized => &key.normalized_text,
            Field::Jamo => &key.jamo_text,
            Field::Display => &key.display_text,
            Field::Initials => &key.initials_text,
        }
    }

    fn weight(self, weights: &FieldWeights) -> f64 {
        match self {
            Field::Normalized => weights.normalized,
            Field::Jamo => weights.jamo,
            Field::Display => weights.display,
            Field::Initials => weights.initials,
        }
    }
}

/// A compiled pattern bound to one field.
pub(crate) struct FieldQuery {
    field: Field,
    pattern: Pattern,
    /// Score of the pattern against its own needle.
    ideal: u32,
}

pub(crate) struct FuzzyScorer {
    matcher: Matcher,
    case_matching: NucleoCaseMatching,
    normalization: Normalization,
    weights: FieldWeights,
    threshold: f64,
    distance: f64,
    buf: Vec<char>,
    indices: Vec<u32>,
}

impl FuzzyScorer {
    pub fn new(config: &SearchConfig) -> Self {
        let case_matching = match config.case_matching {
            CaseMatching::Sensitive => NucleoCaseMatching::Respect,
            CaseMatching::Insensitive => NucleoCaseMatching::Ignore,
            CaseMatching::Smart => NucleoCaseMatching::Smart,
        };

        let normalization = if config.unicode_normalization {
            Normalization::Smart
        } else {
            Normalization::Never
        };

        Self {
            matcher: Matcher::new(NucleoConfig::DEFAULT),
            case_matching,
            normalization,
            weights: config.weights,
            threshold: config.threshold,
            distance: config.distance.max(1) as f64,
            buf: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Pattern matching fields that start with `needle`.
    pub fn prefix(&mut self, field: Field, needle: &str) -> Option<FieldQuery> {
        if needle.is_empty() {
            return None;
        }
        let source = format!("^{}", escape_for_prefix_match(needle));
        let pattern = Pattern::parse(&source, self.case_matching, self.normalization);
        self.compile(field, needle, pattern)
    }

    /// Pattern matching `needle` fuzzily anywhere in the field.
    pub fn fuzzy(&mut self, field: Field, needle: &str) -> Option<FieldQuery> {
        if needle.is_empty() {
            return None;
        }
        let pattern = Pattern::new(
            needle,
            self.case_matching,
            self.normalization,
            AtomKind::Fuzzy,
        );
        self.compile(field, needle, pattern)
    }

    fn compile(&mut self, field: Field, needle: &str, pattern: Pattern) -> Option<FieldQuery> {
        if pattern.atoms.is_empty() {
            return None;
        }
        let ideal = pattern.score(Utf32Str::new(needle, &mut self.buf), &mut self.matcher)?;
        (ideal > 0).then_some(FieldQuery {
            field,
            pattern,
            ideal,
        })
    }

    /// Distance of one field from its query, or `None` if the pattern does not
    /// match or the distance exceeds the threshold.
    fn field_distance(&mut self, query: &FieldQuery, key: &SearchKey) -> Option<f64> {
        let haystack = Utf32Str::new(query.field.text(key), &mut self.buf);

        self.indices.clear();
        let score = query
            .pattern
            .indices(haystack, &mut self.matcher, &mut self.indices)?;
        let first = self.indices.iter().min().copied().unwrap_or(0);

        let quality = (1.0 - f64::from(score) / f64::from(query.ideal)).max(0.0);
        let distance = (quality + f64::from(first) / self.distance).min(1.0);

        (distance <= self.threshold).then_some(distance)
    }

    /// Combined distance over every query that matches, or `None` if none do.
    pub fn score(&mut self, queries: &[FieldQuery], key: &SearchKey) -> Option<f64> {
        let total_weight = self.weights.total();
        let mut combined = 1.0;
        let mut matched = false;

        for query in queries {
            let Some(distance) = self.field_distance(query, key) else {
                continue;
            };
            let norm = query.field.weight(&self.weights) / total_weight;
            combined *= distance.max(f64::EPSILON).powf(norm);
            matched = true;
        }

        matched.then_some(combined)
    }

    /// Scores every candidate against one stage's queries and returns the
    /// matches as `(candidate index, distance)`, best first. Ties keep
    /// candidate order.
    pub fn rank(&mut self, queries: &[FieldQuery], candidates: &[Candidate]) -> Vec<(usize, f64)> {
        if queries.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .filter_map(|(index, candidate)| {
                self.score(queries, &candidate.key)
                    .map(|score| (index, score))
            })
            .collect();

        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked
    }
}
