//! Hamming distance
//!
//! The number of positions at which two equal-length strings differ. Unequal
//! lengths are a [`RowError::LengthMismatch`], never padded.

use super::FallibleEditDistance;
use crate::error::RowError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hamming;

impl Hamming {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FallibleEditDistance for Hamming {
    fn distance(&self, a: &str, b: &str) -> Result<usize, RowError> {
        hamming_distance(a, b)
    }

    fn name(&self) -> &'static str {
        "hamming"
    }
}

/// Count differing chars position by position.
///
/// ```
/// use fuzzytab::algorithms::hamming::hamming_distance;
/// use fuzzytab::RowError;
///
/// assert_eq!(hamming_distance("karolin", "kathrin"), Ok(3));
/// assert_eq!(
///     hamming_distance("abc", "ab"),
///     Err(RowError::LengthMismatch { left: 3, right: 2 })
/// );
/// ```
pub fn hamming_distance(a: &str, b: &str) -> Result<usize, RowError> {
    let (mut left, mut right) = (a.chars(), b.chars());
    let mut differing = 0;
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => differing += usize::from(x != y),
            (None, None) => return Ok(differing),
            _ => {
                return Err(RowError::LengthMismatch {
                    left: a.chars().count(),
                    right: b.chars().count(),
                });
            }
        }
    }
}
