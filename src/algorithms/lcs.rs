//! Longest common subsequence metrics
//!
//! Two distances derive from the LCS length `l`: [`Indel`], which only
//! inserts and deletes (`|a| + |b| - 2l`), and [`LcsSeq`]
//! (`max(|a|, |b|) - l`). Indel normalizes against `|a| + |b|`.

use smallvec::SmallVec;

use super::EditDistance;

/// Char lengths of both sides and their LCS length.
struct Overlap {
    left: usize,
    right: usize,
    common: usize,
}

impl Overlap {
    fn of(a: &str, b: &str) -> Self {
        if a.is_ascii() && b.is_ascii() {
            return Self {
                left: a.len(),
                right: b.len(),
                common: subsequence_len(a.as_bytes(), b.as_bytes()),
            };
        }
        let a: SmallVec<[char; 64]> = a.chars().collect();
        let b: SmallVec<[char; 64]> = b.chars().collect();
        Self {
            left: a.len(),
            right: b.len(),
            common: subsequence_len(&a, &b),
        }
    }
}

fn subsequence_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut row: SmallVec<[usize; 64]> = smallvec::smallvec![0; b.len() + 1];
    for x in a {
        let mut diag = 0;
        for (j, y) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if x == y { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// Length of the longest common subsequence, in chars.
#[must_use]
pub fn lcs_seq_length(a: &str, b: &str) -> usize {
    Overlap::of(a, b).common
}

/// Number of insertions and deletions turning `a` into `b`.
///
/// ```
/// use fuzzytab::algorithms::lcs::indel_distance;
/// assert_eq!(indel_distance("kitten", "sitting"), 5);
/// ```
#[must_use]
pub fn indel_distance(a: &str, b: &str) -> usize {
    let o = Overlap::of(a, b);
    o.left + o.right - 2 * o.common
}

#[must_use]
pub fn lcs_seq_distance(a: &str, b: &str) -> usize {
    let o = Overlap::of(a, b);
    o.left.max(o.right) - o.common
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indel;

impl Indel {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EditDistance for Indel {
    fn distance(&self, a: &str, b: &str) -> usize {
        indel_distance(a, b)
    }

    fn max_distance_for(&self, a: &str, b: &str) -> usize {
        a.chars().count() + b.chars().count()
    }

    fn name(&self) -> &'static str {
        "indel"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LcsSeq;

impl LcsSeq {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EditDistance for LcsSeq {
    fn distance(&self, a: &str, b: &str) -> usize {
        lcs_seq_distance(a, b)
    }

    fn name(&self) -> &'static str {
        "lcsseq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsequence_lengths() {
        assert_eq!(lcs_seq_length("", "abc"), 0);
        assert_eq!(lcs_seq_length("AGGTAB", "GXTXAYB"), 4);
        assert_eq!(lcs_seq_length("kitten", "sitting"), 4);
        assert_eq!(lcs_seq_length("日本語", "日語"), 2);
    }

    #[test]
    fn test_indel_only_inserts_and_deletes() {
        assert_eq!(indel_distance("", ""), 0);
        assert_eq!(indel_distance("flaw", ""), 4);
        assert_eq!(indel_distance("ab", "ba"), 2);
        assert_eq!(Indel::new().normalized("", ""), 100.0);
        // 1 - 5/13
        assert!((Indel::new().normalized("kitten", "sitting") - 61.538461).abs() < 1e-4);
    }

    #[test]
    fn test_lcs_seq_against_longer_side() {
        assert_eq!(lcs_seq_distance("kitten", "sitting"), 3);
        assert_eq!(lcs_seq_distance("same", "same"), 0);
        assert_eq!(LcsSeq::new().normalized("abcd", "ab"), 50.0);
        assert_eq!(lcs_seq_distance("naïve", "naive"), 1);
    }
}
