//! String similarity algorithms
//!
//! Edit distances and Jaro come as free functions plus small calculator
//! types implementing one of three traits. The [`Scorer`](crate::Scorer)
//! dispatches those through the calculators, and calls the ratio family in
//! [`fuzz`] directly.
//!
//! Similarities are on a 0-100 scale and distances are edit counts. All
//! lengths are in `char`s.

pub mod fuzz;
pub mod hamming;
pub mod jaro;
pub mod lcs;
pub mod levenshtein;
pub mod normalize;
pub mod osa;

pub use hamming::*;
pub use jaro::*;
pub use lcs::*;
pub use levenshtein::*;
pub use osa::*;

use crate::error::RowError;

/// `100 * (1 - distance / max_len)`, clamped to `[0, 100]`.
///
/// A `max_len` of zero means both strings were empty, which scores 100.
///
/// ```
/// use fuzzytab::algorithms::normalized_similarity;
/// assert_eq!(normalized_similarity(0, 0), 100.0);
/// assert_eq!(normalized_similarity(1, 4), 75.0);
/// ```
#[inline]
#[must_use]
pub fn normalized_similarity(distance: usize, max_len: usize) -> f64 {
    if max_len == 0 {
        return 100.0;
    }
    let ratio = distance as f64 / max_len as f64;
    (100.0 - 100.0 * ratio).clamp(0.0, 100.0)
}

/// A score in `[0, 100]`, higher is closer.
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    fn name(&self) -> &'static str;
}

/// An integer edit distance defined for every pair of strings.
pub trait EditDistance: Send + Sync {
    fn distance(&self, a: &str, b: &str) -> usize;

    /// Largest distance possible for this pair. Defaults to the longer length.
    fn max_distance_for(&self, a: &str, b: &str) -> usize {
        a.chars().count().max(b.chars().count())
    }

    fn normalized(&self, a: &str, b: &str) -> f64 {
        normalized_similarity(self.distance(a, b), self.max_distance_for(a, b))
    }

    fn name(&self) -> &'static str;
}

// Distances double as similarities through their normalized form.
impl<T: EditDistance> Similarity for T {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        self.normalized(a, b)
    }

    fn name(&self) -> &'static str {
        EditDistance::name(self)
    }
}

/// An edit distance that is undefined for some pairs, such as Hamming on
/// strings of different lengths.
pub trait FallibleEditDistance: Send + Sync {
    fn distance(&self, a: &str, b: &str) -> Result<usize, RowError>;

    fn normalized(&self, a: &str, b: &str) -> Result<f64, RowError> {
        let max_len = a.chars().count().max(b.chars().count());
        self.distance(a, b).map(|d| normalized_similarity(d, max_len))
    }

    fn name(&self) -> &'static str;
}
