//! Ratio family: whole-string, partial, and token-based ratios.
//!
//! All functions return a similarity on the 0–100 scale and are built on the
//! normalized Levenshtein similarity:
//! - `ratio`: whole-string similarity
//! - `partial_ratio`: best window of the longer string against the shorter
//! - `token_sort_ratio`: order-insensitive comparison
//! - `token_set_ratio`: set-based comparison
//! - `wratio`: weighted maximum of the above
//!
//! `partial_ratio` compares directly against char slices of the longer
//! string instead of allocating a `String` per window.

use smallvec::SmallVec;

use super::levenshtein::{levenshtein_similarity, levenshtein_similarity_chars};
use super::normalize::{nfc, sorted_join, tokenize, TokenSet};

/// Whole-string similarity.
///
/// ```
/// use fuzzytab::algorithms::fuzz::ratio;
/// assert_eq!(ratio("", ""), 100.0);
/// assert!((ratio("kitten", "sitting") - 57.1429).abs() < 1e-3);
/// ```
#[inline]
#[must_use]
pub fn ratio(s1: &str, s2: &str) -> f64 {
    levenshtein_similarity(s1, s2)
}

/// Best alignment of the shorter string inside the longer one.
///
/// Slides the shorter string across the longer string and returns the
/// maximum similarity found. Equal lengths reduce to [`ratio`].
///
/// ```
/// use fuzzytab::algorithms::fuzz::partial_ratio;
/// assert_eq!(partial_ratio("test", "this is a test!"), 100.0);
/// ```
#[must_use]
pub fn partial_ratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() && s2.is_empty() {
        return 100.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let s1_chars: SmallVec<[char; 64]> = s1.chars().collect();
    let s2_chars: SmallVec<[char; 64]> = s2.chars().collect();

    let (shorter, longer) = if s1_chars.len() <= s2_chars.len() {
        (&s1_chars[..], &s2_chars[..])
    } else {
        (&s2_chars[..], &s1_chars[..])
    };

    if shorter.len() == longer.len() {
        return levenshtein_similarity_chars(shorter, longer);
    }

    let mut max_score = 0.0f64;
    for window in longer.windows(shorter.len()) {
        max_score = max_score.max(levenshtein_similarity_chars(shorter, window));
        if max_score == 100.0 {
            break;
        }
    }

    max_score
}

/// Ratio of both strings after sorting their tokens.
///
/// "new york mets" and "mets new york" score 100.
///
/// ```
/// use fuzzytab::algorithms::fuzz::token_sort_ratio;
/// assert_eq!(token_sort_ratio("John Smith", "smith JOHN"), 100.0);
/// ```
#[must_use]
pub fn token_sort_ratio(s1: &str, s2: &str) -> f64 {
    ratio(&sorted_tokens(s1), &sorted_tokens(s2))
}

/// Partial ratio of the sorted-token forms.
#[must_use]
pub fn partial_token_sort_ratio(s1: &str, s2: &str) -> f64 {
    partial_ratio(&sorted_tokens(s1), &sorted_tokens(s2))
}

fn sorted_tokens(s: &str) -> String {
    sorted_join(&tokenize(s))
}

/// Intersection and differences of two token sets, each sorted-joined.
struct TokenSplit {
    intersection: String,
    combined1: String,
    combined2: String,
    diff1: String,
    diff2: String,
}

impl TokenSplit {
    fn new(set1: &TokenSet, set2: &TokenSet) -> Self {
        let intersection = set1.unique_intersection(set2).join(" ");
        let diff1 = set1.difference(set2).join(" ");
        let diff2 = set2.difference(set1).join(" ");
        Self {
            combined1: join_nonempty(&intersection, &diff1),
            combined2: join_nonempty(&intersection, &diff2),
            intersection,
            diff1,
            diff2,
        }
    }
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}

/// Token similarity that ignores duplicates and order.
///
/// Builds the sorted intersection `I` of both token sets and the combined
/// strings `I + diff1`, `I + diff2`, then returns the best of
/// `ratio(I, I+diff1)`, `ratio(I, I+diff2)` and `ratio(I+diff1, I+diff2)`.
/// Shared tokens therefore dominate regardless of extra tokens on either
/// side. Two empty token sets score 100; exactly one empty set scores 0.
///
/// ```
/// use fuzzytab::algorithms::fuzz::token_set_ratio;
/// assert_eq!(token_set_ratio("fuzzy was a bear", "fuzzy fuzzy was a bear"), 100.0);
/// ```
#[must_use]
pub fn token_set_ratio(s1: &str, s2: &str) -> f64 {
    let set1 = TokenSet::from_text(s1);
    let set2 = TokenSet::from_text(s2);

    if set1.is_empty() && set2.is_empty() {
        return 100.0;
    }
    if set1.is_empty() || set2.is_empty() {
        return 0.0;
    }

    let split = TokenSplit::new(&set1, &set2);

    let combined = ratio(&split.combined1, &split.combined2);
    if split.intersection.is_empty() {
        return combined;
    }

    ratio(&split.intersection, &split.combined1)
        .max(ratio(&split.intersection, &split.combined2))
        .max(combined)
}

/// Partial variant of [`token_set_ratio`].
///
/// Any shared token is a perfect partial match; otherwise the two set
/// differences are compared with [`partial_ratio`].
#[must_use]
pub fn partial_token_set_ratio(s1: &str, s2: &str) -> f64 {
    let set1 = TokenSet::from_text(s1);
    let set2 = TokenSet::from_text(s2);

    if set1.is_empty() && set2.is_empty() {
        return 100.0;
    }
    if set1.is_empty() || set2.is_empty() {
        return 0.0;
    }

    let split = TokenSplit::new(&set1, &set2);
    if !split.intersection.is_empty() {
        return 100.0;
    }
    partial_ratio(&split.diff1, &split.diff2)
}

/// Best of [`token_sort_ratio`] and [`token_set_ratio`].
#[must_use]
pub fn token_ratio(s1: &str, s2: &str) -> f64 {
    token_sort_ratio(s1, s2).max(token_set_ratio(s1, s2))
}

/// Best of [`partial_token_sort_ratio`] and [`partial_token_set_ratio`].
#[must_use]
pub fn partial_token_ratio(s1: &str, s2: &str) -> f64 {
    partial_token_sort_ratio(s1, s2).max(partial_token_set_ratio(s1, s2))
}

// WRatio weights

/// Weight applied to partial_ratio before the length adjustment.
pub const DEFAULT_PARTIAL_WEIGHT: f64 = 0.9;

/// Weight applied to token-based ratios.
pub const DEFAULT_TOKEN_WEIGHT: f64 = 0.95;

/// Multiplier for very different lengths (ratio > 8.0).
const LENGTH_PENALTY_LONG: f64 = 0.67;

/// Multiplier for moderate length difference (ratio > 1.5).
const LENGTH_PENALTY_MEDIUM: f64 = 1.0;

/// Multiplier for similar lengths (ratio <= 1.5).
const LENGTH_PENALTY_SHORT: f64 = 1.056;

/// Weighted ratio: the best of several methods, each scaled by how much it
/// should be trusted for the given length ratio.
///
/// ```
/// use fuzzytab::algorithms::fuzz::wratio;
/// assert_eq!(wratio("hello", "hello"), 100.0);
/// assert!(wratio("hello", "hello world") > 80.0);
/// ```
#[must_use]
pub fn wratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() && s2.is_empty() {
        return 100.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let len_ratio = len1.max(len2) as f64 / len1.min(len2).max(1) as f64;

    let base_ratio = ratio(s1, s2);

    let length_penalty = if len_ratio > 8.0 {
        LENGTH_PENALTY_LONG
    } else if len_ratio > 1.5 {
        LENGTH_PENALTY_MEDIUM
    } else {
        LENGTH_PENALTY_SHORT
    };
    let partial_weight = (DEFAULT_PARTIAL_WEIGHT * length_penalty).min(1.0);
    let partial_score = partial_ratio(s1, s2) * partial_weight;

    let token_sort = token_sort_ratio(s1, s2) * DEFAULT_TOKEN_WEIGHT;
    let token_set = token_set_ratio(s1, s2) * DEFAULT_TOKEN_WEIGHT;

    base_ratio.max(partial_score).max(token_sort).max(token_set)
}

/// [`ratio`] after Unicode NFC normalization, so composed and decomposed
/// accents compare equal. Scores 0 when either side is empty.
///
/// ```
/// use fuzzytab::algorithms::fuzz::qratio;
/// assert_eq!(qratio("caf\u{e9}", "cafe\u{301}"), 100.0);
/// ```
#[must_use]
pub fn qratio(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }
    ratio(&nfc(s1), &nfc(s2))
}
