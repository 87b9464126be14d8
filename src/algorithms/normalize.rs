//! Tokenization and string normalization
//!
//! Token-based ratios work on lower-cased, whitespace-delimited tokens. The
//! set operations here deduplicate tokens and always emit them in sorted
//! order, so every string built from them is independent of the original
//! token order.

use std::borrow::Cow;

use ahash::AHashSet;
use unicode_normalization::UnicodeNormalization;

/// Split on runs of whitespace and lower-case each token.
///
/// ```
/// use fuzzytab::algorithms::normalize::tokenize;
/// assert_eq!(tokenize("  New  YORK city "), vec!["new", "york", "city"]);
/// ```
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Join tokens in ascending codepoint order with single spaces.
#[must_use]
pub fn sorted_join<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut sorted: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
    sorted.sort_unstable();
    sorted.join(" ")
}

/// Deduplicated tokens of a string.
#[derive(Debug, Clone, Default)]
pub struct TokenSet {
    tokens: AHashSet<String>,
}

impl TokenSet {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            tokens: tokenize(text).into_iter().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens present in both sets, sorted.
    #[must_use]
    pub fn unique_intersection<'a>(&'a self, other: &'a Self) -> Vec<&'a str> {
        sorted_refs(self.tokens.intersection(&other.tokens))
    }

    /// Tokens present in either set, sorted.
    #[must_use]
    pub fn unique_union<'a>(&'a self, other: &'a Self) -> Vec<&'a str> {
        sorted_refs(self.tokens.union(&other.tokens))
    }

    /// Tokens present in `self` but not in `other`, sorted.
    #[must_use]
    pub fn difference<'a>(&'a self, other: &'a Self) -> Vec<&'a str> {
        sorted_refs(self.tokens.difference(&other.tokens))
    }
}

fn sorted_refs<'a>(tokens: impl Iterator<Item = &'a String>) -> Vec<&'a str> {
    let mut out: Vec<&str> = tokens.map(String::as_str).collect();
    out.sort_unstable();
    out
}

/// Lower-case a string only when asked to; borrows otherwise.
#[inline]
#[must_use]
pub fn fold_case(s: &str, case_insensitive: bool) -> Cow<'_, str> {
    if case_insensitive {
        Cow::Owned(s.to_lowercase())
    } else {
        Cow::Borrowed(s)
    }
}

/// Unicode NFC (canonical composition) form of a string.
#[must_use]
pub fn nfc(s: &str) -> String {
    s.nfc().collect()
}
