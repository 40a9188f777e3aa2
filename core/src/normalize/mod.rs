//! Script normalization for search keys and queries.
//!
//! Every display string is projected into three comparison forms:
//! - folded text (`normalize`): NFKC, lowercase, whitespace collapsed
//! - full jamo (`to_full_jamo`): Hangul split into atomic compatibility jamo
//! - initials (`to_initials`): the leading consonant of each Hangul syllable
//!
//! Korean input methods can produce any of these while the user is typing, so
//! each form gets its own prefix index.

use error::NormalizationError;
use unicode_normalization::UnicodeNormalization;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum NormalizationError {
        #[error("Malformed Hangul syllable: U+{0:04X}")]
        MalformedSyllable(u32),
    }
}

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const JUNGSEONG_COUNT: u32 = 21;
const JONGSEONG_COUNT: u32 = 28;

/// Leading consonants in syllable order.
const CHOSEONG: [&str; 19] = [
    "ㄱ", "ㄲ", "ㄴ", "ㄷ", "ㄸ", "ㄹ", "ㅁ", "ㅂ", "ㅃ", "ㅅ", "ㅆ", "ㅇ", "ㅈ", "ㅉ", "ㅊ", "ㅋ",
    "ㅌ", "ㅍ", "ㅎ",
];

/// Vowels in syllable order. Diphthongs are stored pre-split.
const JUNGSEONG: [&str; 21] = [
    "ㅏ", "ㅐ", "ㅑ", "ㅒ", "ㅓ", "ㅔ", "ㅕ", "ㅖ", "ㅗ", "ㅗㅏ", "ㅗㅐ", "ㅗㅣ", "ㅛ", "ㅜ", "ㅜㅓ",
    "ㅜㅔ", "ㅜㅣ", "ㅠ", "ㅡ", "ㅡㅣ", "ㅣ",
];

/// Trailing consonants in syllable order; index 0 is "no final".
/// Cluster finals are stored pre-split. Tense finals (ㄲ, ㅆ) are single jamo.
const JONGSEONG: [&str; 28] = [
    "", "ㄱ", "ㄲ", "ㄱㅅ", "ㄴ", "ㄴㅈ", "ㄴㅎ", "ㄷ", "ㄹ", "ㄹㄱ", "ㄹㅁ", "ㄹㅂ", "ㄹㅅ", "ㄹㅌ",
    "ㄹㅍ", "ㄹㅎ", "ㅁ", "ㅂ", "ㅂㅅ", "ㅅ", "ㅆ", "ㅇ", "ㅈ", "ㅊ", "ㅋ", "ㅌ", "ㅍ", "ㅎ",
];

/// Folds `text` for language-agnostic prefix comparison.
///
/// Applies NFKC, lowercases, trims and collapses interior whitespace runs to a
/// single space.
pub fn normalize(text: &str) -> String {
    let folded: String = text.nfkc().collect::<String>().to_lowercase();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decomposes `text` into a contiguous stream of atomic compatibility jamo.
///
/// The text is normalized first. Compound vowels and cluster finals are split
/// into their components, non-Hangul characters pass through, and all
/// whitespace is removed. Falls back to the normalized text if decomposition
/// fails.
pub fn to_full_jamo(text: &str) -> String {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return normalized;
    }

    match try_full_jamo(&normalized) {
        Ok(jamo) => jamo,
        Err(_) => normalized,
    }
}

/// Extracts the leading consonant of every Hangul syllable in `text`.
///
/// Non-Hangul characters are kept in place; whitespace is removed. The input
/// is not case-folded. Falls back to the raw text without whitespace.
pub fn to_initials(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    match try_initials(text) {
        Ok(initials) => initials,
        Err(_) => strip_whitespace(text),
    }
}

/// Returns true if any character is a Hangul syllable, jamo or compatibility
/// jamo.
pub fn is_korean_text(text: &str) -> bool {
    text.chars()
        .any(|ch| matches!(ch as u32, 0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF))
}

/// Escapes `text` so it can follow a `^` anchor in a fuzzy-matcher pattern.
///
/// Whitespace would otherwise split the pattern into separate atoms and a
/// trailing `$` would turn the anchor into an exact match.
pub fn escape_for_prefix_match(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch.is_whitespace() || (ch == '$' && chars.peek().is_none()) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    escaped
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|ch| !ch.is_whitespace()).collect()
}

fn try_full_jamo(normalized: &str) -> Result<String, NormalizationError> {
    let mut out = String::with_capacity(normalized.len() * 2);

    for ch in normalized.chars() {
        if ch.is_whitespace() {
            continue;
        }

        if let Some((lead, vowel, tail)) = split_syllable(ch)? {
            out.push_str(lead);
            out.push_str(vowel);
            out.push_str(tail);
        } else if let Some(jamo) = atomic_jamo(ch) {
            out.push_str(jamo);
        } else {
            out.push(ch);
        }
    }

    Ok(out)
}

fn try_initials(text: &str) -> Result<String, NormalizationError> {
    let mut out = String::with_capacity(text.len());

    for ch in text.chars() {
        if ch.is_whitespace() {
            continue;
        }

        if let Some((lead, _, _)) = split_syllable(ch)? {
            out.push_str(lead);
        } else if let Some(first) = atomic_jamo(ch).and_then(|jamo| jamo.chars().next()) {
            out.push(first);
        } else {
            out.push(ch);
        }
    }

    Ok(out)
}

/// Splits a precomposed syllable into its (lead, vowel, tail) jamo strings.
///
/// Returns `Ok(None)` for characters outside the syllable block.
fn split_syllable(
    ch: char,
) -> Result<Option<(&'static str, &'static str, &'static str)>, NormalizationError> {
    let code = ch as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        return Ok(None);
    }

    let index = code - SYLLABLE_BASE;
    let lead = index / (JUNGSEONG_COUNT * JONGSEONG_COUNT);
    let vowel = (index % (JUNGSEONG_COUNT * JONGSEONG_COUNT)) / JONGSEONG_COUNT;
    let tail = index % JONGSEONG_COUNT;

    let malformed = || NormalizationError::MalformedSyllable(code);
    Ok(Some((
        CHOSEONG.get(lead as usize).copied().ok_or_else(malformed)?,
        JUNGSEONG.get(vowel as usize).copied().ok_or_else(malformed)?,
        JONGSEONG.get(tail as usize).copied().ok_or_else(malformed)?,
    )))
}

/// Maps a standalone jamo (conjoining or compatibility) to its atomic
/// compatibility jamo sequence.
///
/// NFKC turns compatibility jamo into conjoining jamo, so both blocks show up
/// in normalized text.
fn atomic_jamo(ch: char) -> Option<&'static str> {
    let code = ch as u32;
    match code {
        0x1100..=0x1112 => CHOSEONG.get((code - 0x1100) as usize).copied(),
        0x1161..=0x1175 => JUNGSEONG.get((code - 0x1161) as usize).copied(),
        0x11A8..=0x11C2 => JONGSEONG.get((code - 0x11A8 + 1) as usize).copied(),
        _ => compatibility_cluster(ch),
    }
}

fn compatibility_cluster(ch: char) -> Option<&'static str> {
    let split = match ch {
        'ㄳ' => "ㄱㅅ",
        'ㄵ' => "ㄴㅈ",
        'ㄶ' => "ㄴㅎ",
        'ㄺ' => "ㄹㄱ",
        'ㄻ' => "ㄹㅁ",
        'ㄼ' => "ㄹㅂ",
        'ㄽ' => "ㄹㅅ",
        'ㄾ' => "ㄹㅌ",
        'ㄿ' => "ㄹㅍ",
        'ㅀ' => "ㄹㅎ",
        'ㅄ' => "ㅂㅅ",
        'ㅘ' => "ㅗㅏ",
        'ㅙ' => "ㅗㅐ",
        'ㅚ' => "ㅗㅣ",
        'ㅝ' => "ㅜㅓ",
        'ㅞ' => "ㅜㅔ",
        'ㅟ' => "ㅜㅣ",
        'ㅢ' => "ㅡㅣ",
        _ => return None,
    };
    Some(split)
}
