//! Levenshtein distance
//!
//! Edits are counted over Unicode chars. When the shorter side fits in one
//! machine word the distance comes from Hyyrö's formulation of Myers'
//! bit-vector algorithm; anything longer runs a single-row DP that can stop
//! early once a bound is exceeded.

use ahash::AHashMap;
use smallvec::SmallVec;

use super::{normalized_similarity, EditDistance};

type Chars = SmallVec<[char; 64]>;

fn to_chars(s: &str) -> Chars {
    s.chars().collect()
}

/// Orders a pair as `(shorter, longer)`.
fn by_len<'a>(a: &'a [char], b: &'a [char]) -> (&'a [char], &'a [char]) {
    if a.len() <= b.len() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Per-char occurrence bitmasks of a non-empty pattern of at most 64 chars.
struct PatternMasks {
    masks: AHashMap<char, u64>,
    high_bit: u64,
    len: usize,
}

impl PatternMasks {
    fn build(pattern: &[char]) -> Option<Self> {
        if pattern.is_empty() || pattern.len() > u64::BITS as usize {
            return None;
        }
        let mut masks = AHashMap::with_capacity(pattern.len());
        for (bit, &c) in pattern.iter().enumerate() {
            *masks.entry(c).or_insert(0) |= 1u64 << bit;
        }
        Some(Self {
            masks,
            high_bit: 1u64 << (pattern.len() - 1),
            len: pattern.len(),
        })
    }

    fn distance(&self, text: &[char]) -> usize {
        // Vertical deltas of the last computed column, all +1 initially.
        let mut plus = u64::MAX;
        let mut minus = 0u64;
        let mut dist = self.len;

        for c in text {
            let eq = self.masks.get(c).copied().unwrap_or(0);
            let diag = eq | minus;
            let horiz = ((eq & plus).wrapping_add(plus) ^ plus) | eq;
            let h_plus = minus | !(horiz | plus);
            let h_minus = plus & horiz;

            if h_plus & self.high_bit != 0 {
                dist += 1;
            } else if h_minus & self.high_bit != 0 {
                dist -= 1;
            }

            // Row 0 grows by one per text char.
            let h_plus = (h_plus << 1) | 1;
            let h_minus = h_minus << 1;
            plus = h_minus | !(diag | h_plus);
            minus = h_plus & diag;
        }
        dist
    }
}

/// Single-row DP over `(shorter, longer)`.
///
/// Returns the exact distance when it is at most `bound`. Otherwise returns
/// some value above `bound`, possibly before the last row is filled.
fn row_distance(short: &[char], long: &[char], bound: usize) -> usize {
    let mut row: SmallVec<[usize; 64]> = (0..=short.len()).collect();

    for (i, lc) in long.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        let mut lowest = row[0];

        for (j, sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let substitute = diag + usize::from(lc != sc);
            row[j + 1] = substitute.min(above + 1).min(row[j] + 1);
            diag = above;
            lowest = lowest.min(row[j + 1]);
        }

        // Row minima never decrease.
        if lowest > bound {
            return lowest;
        }
    }
    row[short.len()]
}

fn distance_with_bound(a: &[char], b: &[char], bound: usize) -> usize {
    if a == b {
        return 0;
    }
    let (short, long) = by_len(a, b);
    if long.len() - short.len() > bound {
        return long.len() - short.len();
    }
    match PatternMasks::build(short) {
        Some(masks) => masks.distance(long),
        None => row_distance(short, long, bound),
    }
}

/// Levenshtein distance with an optional cutoff.
///
/// A bounded distance stops work once the result is known to exceed the
/// bound and reports `max_distance + 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Levenshtein {
    pub max_distance: Option<usize>,
}

impl Levenshtein {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_distance(max_distance: usize) -> Self {
        Self {
            max_distance: Some(max_distance),
        }
    }

    /// The distance, or `None` when it exceeds the cutoff.
    #[must_use]
    pub fn compute(&self, a: &str, b: &str) -> Option<usize> {
        levenshtein_distance_bounded(a, b, self.max_distance)
    }
}

impl EditDistance for Levenshtein {
    fn distance(&self, a: &str, b: &str) -> usize {
        let Some(bound) = self.max_distance else {
            return levenshtein(a, b);
        };
        self.compute(a, b).unwrap_or(bound.saturating_add(1))
    }

    fn name(&self) -> &'static str {
        "levenshtein"
    }
}

/// Levenshtein distance, or `None` when it is larger than `max_distance`.
///
/// ```
/// use fuzzytab::algorithms::levenshtein::levenshtein_distance_bounded;
///
/// assert_eq!(levenshtein_distance_bounded("flaw", "lawn", None), Some(2));
/// assert_eq!(levenshtein_distance_bounded("flaw", "lawn", Some(2)), Some(2));
/// assert_eq!(levenshtein_distance_bounded("flaw", "lawn", Some(1)), None);
/// ```
#[must_use]
pub fn levenshtein_distance_bounded(
    a: &str,
    b: &str,
    max_distance: Option<usize>,
) -> Option<usize> {
    if a == b {
        return Some(0);
    }
    let (a, b) = (to_chars(a), to_chars(b));
    match max_distance {
        None => Some(levenshtein_chars(&a, &b)),
        Some(bound) => {
            let dist = distance_with_bound(&a, &b, bound);
            (dist <= bound).then_some(dist)
        }
    }
}

#[inline]
#[must_use]
pub fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    distance_with_bound(a, b, usize::MAX)
}

/// Minimum number of single-char insertions, deletions and substitutions
/// turning `a` into `b`.
///
/// ```
/// use fuzzytab::algorithms::levenshtein::levenshtein;
/// assert_eq!(levenshtein("gumbo", "gambol"), 2);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
#[inline]
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    levenshtein_chars(&to_chars(a), &to_chars(b))
}

/// Levenshtein distance as a 0-100 similarity against the longer length.
#[inline]
#[must_use]
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    levenshtein_similarity_chars(&to_chars(a), &to_chars(b))
}

/// Char-slice form of [`levenshtein_similarity`], used by the partial ratio
/// to score windows without re-collecting them.
#[inline]
#[must_use]
pub fn levenshtein_similarity_chars(a: &[char], b: &[char]) -> f64 {
    normalized_similarity(levenshtein_chars(a, b), a.len().max(b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_classic_pairs() {
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("gumbo", "gambol"), 2);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("book", "back"), 2);
        assert_eq!(levenshtein("ab", "ba"), 2);
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abcd", ""), 4);
        assert_eq!(levenshtein("", "xy"), 2);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        assert_eq!(levenshtein("naïve", "naive"), 1);
        assert_eq!(levenshtein("😀a", "a"), 1);
        assert_eq!(levenshtein("東京", "京都"), 2);
    }

    #[test]
    fn test_bitmask_and_row_dp_agree() {
        let pairs = [
            ("flaw", "lawn"),
            ("intention", "execution"),
            ("abcabcabc", "cbacbacba"),
            ("a", "bbbbbb"),
        ];
        for (a, b) in pairs {
            let (a, b) = (chars(a), chars(b));
            let (short, long) = by_len(&a, &b);
            let masks = PatternMasks::build(short).unwrap();
            assert_eq!(masks.distance(long), row_distance(short, long, usize::MAX));
        }
    }

    #[test]
    fn test_patterns_longer_than_a_word() {
        let a = "ab".repeat(40);
        let mut b = a.clone();
        b.replace_range(10..11, "z");
        assert_eq!(levenshtein(&a, &b), 1);
        assert_eq!(levenshtein(&a, &(a.clone() + "tail")), 4);
        assert_eq!(levenshtein_distance_bounded(&a, &"ba".repeat(40), Some(1)), None);
        assert_eq!(levenshtein_distance_bounded(&a, &b, Some(1)), Some(1));
    }

    #[test]
    fn test_bounded_cutoffs() {
        assert_eq!(levenshtein_distance_bounded("kitten", "sitting", Some(2)), None);
        assert_eq!(levenshtein_distance_bounded("kitten", "sitting", Some(3)), Some(3));
        assert_eq!(levenshtein_distance_bounded("same", "same", Some(0)), Some(0));
        assert_eq!(levenshtein_distance_bounded("", "abcd", Some(3)), None);
        assert_eq!(levenshtein_distance_bounded("", "abcd", Some(4)), Some(4));
    }

    #[test]
    fn test_struct_reports_bound_plus_one() {
        let capped = Levenshtein::with_max_distance(1);
        assert_eq!(capped.compute("flaw", "lawn"), None);
        assert_eq!(EditDistance::distance(&capped, "flaw", "lawn"), 2);
        assert_eq!(EditDistance::distance(&capped, "abc", "xyz"), 2);
        assert_eq!(Levenshtein::new().compute("abc", "xyz"), Some(3));
    }

    #[test]
    fn test_similarity_scale() {
        assert_eq!(levenshtein_similarity("", ""), 100.0);
        assert_eq!(levenshtein_similarity("abcd", "abce"), 75.0);
        assert_eq!(levenshtein_similarity("abc", "xyz"), 0.0);
        assert!((levenshtein_similarity("kitten", "sitting") - 57.142857).abs() < 1e-4);
    }
}
