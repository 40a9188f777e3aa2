use serde::{Deserialize, Serialize};
use std::fmt;

/// Case handling of the fuzzy matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMatching {
    Sensitive,
    #[default]
    Insensitive,
    /// Case-insensitive unless query contains uppercase.
    Smart,
}

impl fmt::Display for CaseMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseMatching::Sensitive => write!(f, "sensitive"),
            CaseMatching::Insensitive => write!(f, "insensitive"),
            CaseMatching::Smart => write!(f, "smart"),
        }
    }
}

/// Autocomplete tuning. Every field has a default, so a partial `[search]`
/// table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Limit used when the caller does not pass one.
    pub default_limit: usize,
    /// Hard cap on the number of results.
    pub max_limit: usize,
    /// Per-field prefix candidates are capped at
    /// `max(candidate_floor, limit * candidate_multiplier)`.
    pub candidate_floor: usize,
    pub candidate_multiplier: usize,
    /// Shorter jamo queries skip the jamo index.
    pub min_jamo_len: usize,
    /// Shorter initials queries skip the initials index.
    pub min_initials_len: usize,
    pub weights: FieldWeights,
    /// Fuzzy matches scoring worse than this are dropped (0 = exact, 1 = no match).
    pub threshold: f64,
    /// Character distance over which a late match position costs a full point.
    pub distance: usize,
    pub bonuses: PrefixBonuses,
    pub backfill: BackfillScores,
    pub case_matching: CaseMatching,
    pub unicode_normalization: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 10,
            candidate_floor: 50,
            candidate_multiplier: 10,
            min_jamo_len: 2,
            min_initials_len: 2,
            weights: FieldWeights::default(),
            threshold: 0.35,
            distance: 30,
            bonuses: PrefixBonuses::default(),
            backfill: BackfillScores::default(),
            case_matching: CaseMatching::default(),
            unicode_normalization: true,
        }
    }
}

impl SearchConfig {
    /// Resolves a caller-supplied limit: missing means `default_limit`,
    /// anything larger than `max_limit` is clamped.
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }

    /// Number of candidates fetched from each prefix index.
    pub fn candidate_cap(&self, limit: usize) -> usize {
        self.candidate_floor
            .max(limit.saturating_mul(self.candidate_multiplier))
    }

    pub(crate) fn problems(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_limit == 0 {
            errors.push("search.max_limit must be at least 1".to_string());
        }
        if self.candidate_floor == 0 {
            errors.push("search.candidate_floor must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            errors.push("search.threshold must be between 0 and 1".to_string());
        }
        if self.distance == 0 {
            errors.push("search.distance must be at least 1".to_string());
        }
        if !self.weights.is_valid() {
            errors.push("search.weights must be non-negative with a positive sum".to_string());
        }

        errors
    }
}

/// Relative weight of each field in the combined fuzzy score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub normalized: f64,
    pub jamo: f64,
    pub display: f64,
    pub initials: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            normalized: 0.45,
            jamo: 0.30,
            display: 0.20,
            initials: 0.05,
        }
    }
}

impl FieldWeights {
    pub fn total(&self) -> f64 {
        self.normalized + self.jamo + self.display + self.initials
    }

    fn is_valid(&self) -> bool {
        let all = [self.normalized, self.jamo, self.display, self.initials];
        all.iter().all(|w| w.is_finite() && *w >= 0.0) && self.total() > 0.0
    }
}

/// Amounts subtracted from a fuzzy score when a field starts with the
/// matching query projection. Bonuses stack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixBonuses {
    pub normalized: f64,
    pub jamo: f64,
    pub initials: f64,
    pub display: f64,
}

impl Default for PrefixBonuses {
    fn default() -> Self {
        Self {
            normalized: 0.12,
            jamo: 0.08,
            initials: 0.04,
            display: 0.05,
        }
    }
}

/// Synthetic scores for candidates the fuzzy pass did not return, by the
/// strongest field they prefix-match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackfillScores {
    pub normalized: f64,
    pub jamo: f64,
    pub initials: f64,
    pub display: f64,
    pub other: f64,
}

impl Default for BackfillScores {
    fn default() -> Self {
        Self {
            normalized: 0.10,
            jamo: 0.20,
            initials: 0.30,
            display: 0.40,
            other: 0.90,
        }
    }
}
