//! Jaro and Jaro-Winkler similarity
//!
//! Both report on the 0-100 scale. Winkler's variant adds a bonus for a
//! shared prefix, which suits short names and identifiers. Pure ASCII pairs
//! are compared byte-wise.

use smallvec::SmallVec;

use super::Similarity;

/// Prefix bonus per shared leading char.
pub const DEFAULT_PREFIX_WEIGHT: f64 = 0.1;

/// At most this many leading chars count toward the prefix bonus.
pub const MAX_PREFIX_LENGTH: usize = 4;

/// The prefix bonus applies only to pairs whose Jaro score (0-1) is above this.
pub const WINKLER_THRESHOLD: f64 = 0.7;

const MAX_PREFIX_WEIGHT: f64 = 0.25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Jaro;

impl Jaro {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Similarity for Jaro {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        jaro_similarity(a, b)
    }

    fn name(&self) -> &'static str {
        "jaro"
    }
}

/// Jaro-Winkler with a configurable prefix weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JaroWinkler {
    /// Kept in `[0.0, 0.25]` so scores never pass 100.
    pub prefix_weight: f64,
}

impl Default for JaroWinkler {
    fn default() -> Self {
        Self {
            prefix_weight: DEFAULT_PREFIX_WEIGHT,
        }
    }
}

impl JaroWinkler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix_weight(mut self, weight: f64) -> Self {
        self.prefix_weight = weight.clamp(0.0, MAX_PREFIX_WEIGHT);
        self
    }
}

impl Similarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        jaro_winkler_similarity_params(a, b, self.prefix_weight)
    }

    fn name(&self) -> &'static str {
        "jaro_winkler"
    }
}

/// Jaro similarity (0-100).
///
/// Two empty strings score 100. An empty string against anything else
/// scores 0.
///
/// ```
/// use fuzzytab::algorithms::jaro::jaro_similarity;
/// assert!((jaro_similarity("MARTHA", "MARHTA") - 94.4444).abs() < 1e-3);
/// ```
#[inline]
#[must_use]
pub fn jaro_similarity(a: &str, b: &str) -> f64 {
    100.0 * jaro_fraction(a, b)
}

#[inline]
#[must_use]
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    jaro_winkler_similarity_params(a, b, DEFAULT_PREFIX_WEIGHT)
}

/// Jaro-Winkler similarity (0-100) with an explicit prefix weight.
///
/// Pairs at or below [`WINKLER_THRESHOLD`] keep their plain Jaro score.
/// Above it, each shared leading char (up to [`MAX_PREFIX_LENGTH`]) closes
/// `prefix_weight` of the remaining gap to 100.
#[must_use]
pub fn jaro_winkler_similarity_params(a: &str, b: &str, prefix_weight: f64) -> f64 {
    let jaro = jaro_fraction(a, b);
    if jaro <= WINKLER_THRESHOLD {
        return 100.0 * jaro;
    }

    let shared = a
        .chars()
        .zip(b.chars())
        .take(MAX_PREFIX_LENGTH)
        .take_while(|(x, y)| x == y)
        .count();
    let bonus = shared as f64 * prefix_weight.clamp(0.0, MAX_PREFIX_WEIGHT);
    100.0 * (jaro + bonus * (1.0 - jaro))
}

fn jaro_fraction(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_ascii() && b.is_ascii() {
        return jaro_slices(a.as_bytes(), b.as_bytes());
    }
    let a: SmallVec<[char; 64]> = a.chars().collect();
    let b: SmallVec<[char; 64]> = b.chars().collect();
    jaro_slices(&a, &b)
}

/// Jaro on the 0-1 scale over any slice of comparable units.
fn jaro_slices<T: PartialEq + Copy>(a: &[T], b: &[T]) -> f64 {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        (false, false) => {}
    }

    // Units farther apart than this never match.
    let reach = (a.len().max(b.len()) / 2).saturating_sub(1);

    let mut taken: SmallVec<[bool; 64]> = smallvec::smallvec![false; b.len()];
    let mut a_hits: SmallVec<[T; 64]> = SmallVec::new();

    for (i, &unit) in a.iter().enumerate() {
        let mut window = i.saturating_sub(reach)..(i + reach + 1).min(b.len());
        if let Some(j) = window.find(|&j| !taken[j] && b[j] == unit) {
            taken[j] = true;
            a_hits.push(unit);
        }
    }

    if a_hits.is_empty() {
        return 0.0;
    }

    let b_hits = b.iter().zip(&taken).filter(|(_, t)| **t).map(|(u, _)| u);
    let out_of_order = a_hits.iter().zip(b_hits).filter(|(x, y)| x != y).count();

    let m = a_hits.len() as f64;
    let half_transpositions = (out_of_order / 2) as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - half_transpositions) / m) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-3, "{actual} != {expected}");
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(jaro_similarity("", ""), 100.0);
        assert_eq!(jaro_similarity("same", "same"), 100.0);
        assert_eq!(jaro_similarity("abc", "xyz"), 0.0);
        assert_eq!(jaro_similarity("", "x"), 0.0);
        assert_eq!(jaro_similarity("x", ""), 0.0);
    }

    #[test]
    fn test_reference_pairs() {
        close(jaro_similarity("MARTHA", "MARHTA"), 94.4444);
        close(jaro_similarity("DWAYNE", "DUANE"), 82.2222);
        close(jaro_similarity("DIXON", "DICKSONX"), 76.6667);
    }

    #[test]
    fn test_winkler_rewards_shared_prefix() {
        close(jaro_winkler_similarity("MARTHA", "MARHTA"), 96.1111);
        close(jaro_winkler_similarity("DWAYNE", "DUANE"), 84.0);
        close(jaro_winkler_similarity("DIXON", "DICKSONX"), 81.3333);
    }

    #[test]
    fn test_winkler_skips_weak_pairs() {
        let (a, b) = ("abcdef", "azzzzz");
        assert!(jaro_similarity(a, b) <= 70.0);
        assert_eq!(jaro_winkler_similarity(a, b), jaro_similarity(a, b));
    }

    #[test]
    fn test_prefix_weight_is_clamped() {
        let heavy = JaroWinkler::new().with_prefix_weight(0.2);
        assert!(heavy.similarity("MARTHA", "MARHTA") > jaro_winkler_similarity("MARTHA", "MARHTA"));
        assert_eq!(JaroWinkler::new().with_prefix_weight(3.0).prefix_weight, 0.25);
        assert_eq!(JaroWinkler::new().with_prefix_weight(-1.0).prefix_weight, 0.0);
    }

    #[test]
    fn test_argument_order_does_not_matter() {
        for (a, b) in [("crate", "trace"), ("DWAYNE", "DUANE"), ("abcb", "bcab")] {
            assert_eq!(jaro_similarity(a, b), jaro_similarity(b, a));
            assert_eq!(jaro_winkler_similarity(a, b), jaro_winkler_similarity(b, a));
        }
    }

    #[test]
    fn test_non_ascii_counts_chars() {
        close(jaro_similarity("日本語", "日本"), 88.8889);
        close(jaro_similarity("cafe", "café"), 83.3333);
    }
}
