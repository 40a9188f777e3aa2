use marquee_core::normalize::{is_korean_text, normalize, to_full_jamo, to_initials};

/// The forms of a user query compared against each indexed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryProjections {
    /// Trimmed query as typed; compared against display text.
    pub raw: String,
    pub normalized: String,
    pub jamo: String,
    /// Only computed when the query contains Hangul.
    pub initials: Option<String>,
}

impl QueryProjections {
    pub fn new(query: &str) -> Self {
        let raw = query.trim().to_string();
        let initials = is_korean_text(query).then(|| to_initials(query));

        Self {
            normalized: normalize(query),
            jamo: to_full_jamo(query),
            initials,
            raw,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Jamo projection, if long enough to be worth a prefix lookup.
    pub fn jamo_at_least(&self, min_len: usize) -> Option<&str> {
        let jamo = self.jamo.as_str();
        (!jamo.is_empty() && jamo.chars().count() >= min_len).then_some(jamo)
    }

    /// Initials projection, if present and long enough for a prefix lookup.
    /// Single consonants match too much of the index.
    pub fn initials_at_least(&self, min_len: usize) -> Option<&str> {
        self.initials
            .as_deref()
            .filter(|initials| !initials.is_empty() && initials.chars().count() >= min_len)
    }
}
