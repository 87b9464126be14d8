//! Optimal String Alignment distance
//!
//! Levenshtein plus one extra edit: swapping two adjacent chars. This is the
//! restricted Damerau-Levenshtein distance, so a swapped pair can't be edited
//! again. `osa("ca", "abc")` is 3 where unrestricted Damerau gives 2, and the
//! triangle inequality does not hold.

use smallvec::SmallVec;

use super::EditDistance;

type Row = SmallVec<[usize; 64]>;

/// OSA distance with an optional cutoff, mirroring
/// [`Levenshtein`](super::Levenshtein).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Osa {
    pub max_distance: Option<usize>,
}

impl Osa {
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

    #[must_use]
    pub fn compute(&self, a: &str, b: &str) -> Option<usize> {
        osa_distance_bounded(a, b, self.max_distance)
    }
}

impl EditDistance for Osa {
    fn distance(&self, a: &str, b: &str) -> usize {
        let Some(bound) = self.max_distance else {
            return osa_distance(a, b);
        };
        self.compute(a, b).unwrap_or(bound.saturating_add(1))
    }

    fn name(&self) -> &'static str {
        "osa"
    }
}

/// ```
/// use fuzzytab::algorithms::osa::osa_distance;
/// assert_eq!(osa_distance("ab", "ba"), 1);
/// assert_eq!(osa_distance("ca", "abc"), 3);
/// ```
#[inline]
#[must_use]
pub fn osa_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a: SmallVec<[char; 64]> = a.chars().collect();
    let b: SmallVec<[char; 64]> = b.chars().collect();
    rolling_rows(&a, &b, usize::MAX)
}

/// OSA distance, or `None` when it is larger than `max_distance`.
#[must_use]
pub fn osa_distance_bounded(a: &str, b: &str, max_distance: Option<usize>) -> Option<usize> {
    let Some(bound) = max_distance else {
        return Some(osa_distance(a, b));
    };
    if a == b {
        return Some(0);
    }
    let a: SmallVec<[char; 64]> = a.chars().collect();
    let b: SmallVec<[char; 64]> = b.chars().collect();
    if a.len().abs_diff(b.len()) > bound {
        return None;
    }
    let dist = rolling_rows(&a, &b, bound);
    (dist <= bound).then_some(dist)
}

/// Three-row DP. The swap case reads two rows back.
///
/// Gives up with some value above `bound` once two consecutive rows are
/// entirely above it, since a swap can jump a single row.
fn rolling_rows(a: &[char], b: &[char], bound: usize) -> usize {
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let width = b.len() + 1;
    let mut two_back: Row = smallvec::smallvec![0; width];
    let mut above: Row = (0..width).collect();
    let mut current: Row = smallvec::smallvec![0; width];
    let mut above_min = 0;

    for (i, &ac) in a.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];

        for (j, &bc) in b.iter().enumerate() {
            let mut cell = (above[j + 1] + 1)
                .min(current[j] + 1)
                .min(above[j] + usize::from(ac != bc));

            let swapped = i > 0 && j > 0 && ac == b[j - 1] && a[i - 1] == bc;
            if swapped {
                cell = cell.min(two_back[j - 1] + 1);
            }

            current[j + 1] = cell;
            row_min = row_min.min(cell);
        }

        if row_min > bound && above_min > bound {
            return row_min;
        }
        above_min = row_min;

        std::mem::swap(&mut two_back, &mut above);
        std::mem::swap(&mut above, &mut current);
    }
    above[b.len()]
}
