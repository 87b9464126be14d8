//! Best-match search engine
//!
//! For each master string, scans the whole reference list under one
//! [`Scorer`] and keeps the best entry: highest similarity, or lowest
//! distance for distance methods. Only a strictly better score replaces the
//! current best, so ties go to the first reference in list order.
//!
//! Length-based bounds let the scan skip references that provably cannot
//! beat the current best. The bounds are exact consequences of
//! `distance >= ||a| - |b||`, so pruning never changes the result.

use serde::{Deserialize, Serialize};

use crate::algorithms::{normalize::fold_case, normalized_similarity, Levenshtein, Osa};
use crate::batch::TextCell;
use crate::error::RowError;
use crate::scoring::{Method, Score, Scorer};

/// Winner of one best-match search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestMatch {
    /// Position in the reference list
    pub index: usize,
    pub score: Score,
}

/// Reference list prepared once and shared by every master row.
///
/// Case folding is applied here so each reference is folded once per batch
/// rather than once per comparison. Entries that are not valid UTF-8 keep
/// their slot (indices stay aligned with the input) but are never scored.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    scorer: Scorer,
    entries: Vec<Option<String>>,
    char_lens: Vec<usize>,
}

impl ReferenceSet {
    pub fn new<S: AsRef<str>>(references: &[S], scorer: Scorer) -> Self {
        Self::build(references.iter().map(|r| Some(r.as_ref())), scorer)
    }

    /// Prepare references from raw host cells.
    pub fn from_cells<C: TextCell>(references: &[C], scorer: Scorer) -> Self {
        Self::build(references.iter().map(TextCell::as_text), scorer)
    }

    fn build<'a>(references: impl Iterator<Item = Option<&'a str>>, scorer: Scorer) -> Self {
        let case_insensitive = scorer.options().case_insensitive;
        let entries: Vec<Option<String>> = references
            .map(|r| r.map(|text| fold_case(text, case_insensitive).into_owned()))
            .collect();
        let char_lens = entries
            .iter()
            .map(|r| r.as_deref().map_or(0, |text| text.chars().count()))
            .collect();
        Self {
            scorer,
            entries,
            char_lens,
        }
    }

    /// Number of entries that could not be decoded.
    #[must_use]
    pub fn malformed_count(&self) -> usize {
        self.entries.iter().filter(|r| r.is_none()).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    /// Find the best reference for `master`.
    ///
    /// References the method cannot score (Hamming on unequal lengths,
    /// malformed UTF-8) are skipped. If none can be scored, the first such
    /// row error is returned.
    ///
    /// ```
    /// use fuzzytab::{ReferenceSet, Scorer};
    ///
    /// let refs = ["Microsoft Corp", "Google LLC", "Google Inc"];
    /// let set = ReferenceSet::new(&refs, Scorer::from_name("token_set").unwrap());
    /// let best = set.search("Gogle").unwrap();
    /// assert!(refs[best.index].starts_with("Google"));
    /// ```
    pub fn search(&self, master: &str) -> Result<BestMatch, RowError> {
        if self.entries.is_empty() {
            return Err(RowError::EmptyReferenceList);
        }

        let master = fold_case(master, self.scorer.options().case_insensitive);
        let master_len = master.chars().count();
        let method = self.scorer.method();

        let mut best: Option<BestMatch> = None;
        let mut first_error: Option<RowError> = None;

        for (index, (reference, &ref_len)) in self.entries.iter().zip(&self.char_lens).enumerate() {
            if let Some(current) = best {
                if is_perfect(&current.score) {
                    break;
                }
                if let Some(bound) = score_bound(method, master_len, ref_len) {
                    if !bound.beats(&current.score) {
                        continue;
                    }
                }
            }

            let Some(reference) = reference else {
                first_error.get_or_insert(RowError::EncodingError { column: 1 });
                continue;
            };

            let cutoff = best.and_then(|current| Cutoff::below(method, &current.score));
            let scored = match cutoff {
                Some(cutoff) => match cutoff.compute(&master, reference) {
                    Some(distance) => Ok(Score::Distance(distance)),
                    None => continue,
                },
                None => self.scorer.score_prepared(&master, reference),
            };

            match scored {
                Ok(score) => {
                    if best.map_or(true, |current| score.beats(&current.score)) {
                        best = Some(BestMatch { index, score });
                    }
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match (best, first_error) {
            (Some(found), _) => Ok(found),
            (None, Some(err)) => Err(err),
            (None, None) => Err(RowError::EmptyReferenceList),
        }
    }
}

/// Bounded calculator that gives up on references which cannot beat the
/// current best distance.
enum Cutoff {
    Levenshtein(Levenshtein),
    Osa(Osa),
}

impl Cutoff {
    fn below(method: Method, current: &Score) -> Option<Self> {
        let Score::Distance(best) = *current else {
            return None;
        };
        let max_distance = best.checked_sub(1)?;
        match method {
            Method::Levenshtein => {
                Some(Self::Levenshtein(Levenshtein::with_max_distance(max_distance)))
            }
            Method::Osa => Some(Self::Osa(Osa::with_max_distance(max_distance))),
            _ => None,
        }
    }

    fn compute(&self, a: &str, b: &str) -> Option<usize> {
        match self {
            Self::Levenshtein(lev) => lev.compute(a, b),
            Self::Osa(osa) => osa.compute(a, b),
        }
    }
}

/// Find the best entry of `references` for `master`.
///
/// Convenience wrapper over [`ReferenceSet`] for a single search.
pub fn best_match<S: AsRef<str>>(
    master: &str,
    references: &[S],
    scorer: Scorer,
) -> Result<BestMatch, RowError> {
    ReferenceSet::new(references, scorer).search(master)
}

/// Nothing can strictly beat a perfect score.
fn is_perfect(score: &Score) -> bool {
    match *score {
        Score::Similarity(s) => s >= 100.0,
        Score::Distance(d) => d == 0,
    }
}

/// Best score a pair with these char lengths could possibly reach.
///
/// `None` means the method has no cheap length bound.
fn score_bound(method: Method, len_a: usize, len_b: usize) -> Option<Score> {
    let diff = len_a.abs_diff(len_b);
    let max_len = len_a.max(len_b);
    match method {
        Method::Ratio
        | Method::NormalizedLevenshtein
        | Method::NormalizedOsa
        | Method::NormalizedLcsSeq => Some(Score::Similarity(normalized_similarity(diff, max_len))),
        Method::NormalizedIndel => {
            Some(Score::Similarity(normalized_similarity(diff, len_a + len_b)))
        }
        Method::Levenshtein | Method::Osa | Method::Indel | Method::LcsSeq => {
            Some(Score::Distance(diff))
        }
        _ => None,
    }
}
