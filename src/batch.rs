//! Batch evaluator
//!
//! Runs pairwise scoring or best-match search over host rows. Every row is
//! independent, so rows are cut into fixed-size chunks and the chunks are
//! scored in parallel on a rayon pool. Each chunk fills its own output vector
//! and the vectors are concatenated in chunk order, so the output order is
//! always the input order regardless of scheduling.
//!
//! Row failures are values (`Result<T, RowError>` per row); only
//! invocation-level problems are returned as [`FuzzError`].

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::AHashMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FuzzError, Result, RowError};
use crate::protocol::RowStatus;
use crate::scoring::{Score, Scorer};
use crate::search::{BestMatch, ReferenceSet};

/// Minimum number of rows for parallel processing.
///
/// Below this, sequential processing is faster than coordinating the pool.
const PARALLEL_THRESHOLD: usize = 100;

/// Default rows per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Outcome of one row.
pub type RowResult<T> = std::result::Result<T, RowError>;

/// A host cell that should hold UTF-8 text.
pub trait TextCell: Sync {
    /// The cell's text, or `None` if it is not valid UTF-8.
    fn as_text(&self) -> Option<&str>;
}

impl TextCell for str {
    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl TextCell for String {
    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl TextCell for [u8] {
    fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(self).ok()
    }
}

impl TextCell for Vec<u8> {
    fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(self).ok()
    }
}

impl<T: TextCell + ?Sized> TextCell for &T {
    fn as_text(&self) -> Option<&str> {
        (**self).as_text()
    }
}

fn decode<C: TextCell>(cell: &C, column: usize) -> RowResult<&str> {
    cell.as_text().ok_or(RowError::EncodingError { column })
}

/// Scheduling knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Dedicated pool size; `None` uses rayon's global pool
    pub workers: Option<usize>,
    /// Rows per chunk
    pub chunk_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(FuzzError::InvalidOption {
                name: "workers",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.chunk_size == 0 {
            return Err(FuzzError::InvalidOption {
                name: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Applies one [`Scorer`] to whole columns.
#[derive(Debug, Clone, Copy)]
pub struct BatchEvaluator {
    scorer: Scorer,
    config: BatchConfig,
}

impl BatchEvaluator {
    pub fn new(scorer: Scorer, config: BatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { scorer, config })
    }

    #[must_use]
    pub fn scorer(&self) -> Scorer {
        self.scorer
    }

    /// Score row-aligned columns; one result per row, in row order.
    ///
    /// ```
    /// use fuzzytab::{BatchConfig, BatchEvaluator, RowError, Score, Scorer};
    ///
    /// let scorer = Scorer::from_name("hamming").unwrap();
    /// let eval = BatchEvaluator::new(scorer, BatchConfig::default()).unwrap();
    /// let out = eval.pairwise(&["abc", "abc"], &["abd", "ab"]).unwrap();
    /// assert_eq!(out[0], Ok(Score::Distance(1)));
    /// assert_eq!(out[1], Err(RowError::LengthMismatch { left: 3, right: 2 }));
    /// ```
    pub fn pairwise<A, B>(&self, left: &[A], right: &[B]) -> Result<Vec<RowResult<Score>>>
    where
        A: TextCell,
        B: TextCell,
    {
        if left.len() != right.len() {
            return Err(FuzzError::ColumnLengthMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        info!(
            mode = "pairwise",
            method = %self.scorer.method(),
            rows = left.len(),
            workers = ?self.config.workers,
            "starting batch"
        );

        let scorer = self.scorer;
        let results = self.map_rows(left.len(), |i| {
            let a = decode(&left[i], 0)?;
            let b = decode(&right[i], 1)?;
            scorer.score(a, b)
        })?;

        report_failures("pairwise", &results);
        Ok(results)
    }

    /// Best reference for every master row, in master order.
    ///
    /// An empty reference list fails every row with
    /// [`RowError::EmptyReferenceList`] rather than the whole call.
    pub fn best_match<M, R>(
        &self,
        masters: &[M],
        references: &[R],
    ) -> Result<Vec<RowResult<BestMatch>>>
    where
        M: TextCell,
        R: TextCell,
    {
        let reference_set = ReferenceSet::from_cells(references, self.scorer);

        info!(
            mode = "best_match",
            method = %self.scorer.method(),
            masters = masters.len(),
            references = reference_set.len(),
            workers = ?self.config.workers,
            "starting batch"
        );
        if reference_set.malformed_count() > 0 {
            warn!(
                malformed = reference_set.malformed_count(),
                "reference entries with malformed UTF-8 will never match"
            );
        }

        let total = masters.len();
        let completed = AtomicUsize::new(0);
        let report_every = (total / 10).max(1);

        let results = self.map_chunks(total, |range| {
            let len = range.len();
            let rows: Vec<RowResult<BestMatch>> = range
                .map(|i| reference_set.search(decode(&masters[i], 0)?))
                .collect();

            let before = completed.fetch_add(len, Ordering::Relaxed);
            let after = before + len;
            if after / report_every > before / report_every {
                debug!(matched = after, total, "best-match progress");
            }
            rows
        })?;

        report_failures("best_match", &results);
        Ok(results)
    }

    /// Apply `f` to every row index.
    pub fn map_rows<T, F>(&self, rows: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(usize) -> T + Sync,
    {
        self.map_chunks(rows, |range| range.map(&f).collect())
    }

    /// Apply `f` to consecutive row ranges of at most `chunk_size` rows and
    /// concatenate the per-chunk outputs in row order.
    fn map_chunks<T, F>(&self, rows: usize, f: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(Range<usize>) -> Vec<T> + Sync,
    {
        let chunks = chunk_ranges(rows, self.config.chunk_size);

        if rows < PARALLEL_THRESHOLD {
            return Ok(chunks.into_iter().flat_map(&f).collect());
        }

        let run = || -> Vec<T> {
            let per_chunk: Vec<Vec<T>> = chunks
                .into_par_iter()
                .map(|range| {
                    let start = range.start;
                    let out = f(range);
                    debug!(start, rows = out.len(), "chunk complete");
                    out
                })
                .collect();
            per_chunk.into_iter().flatten().collect()
        };

        match self.config.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()
                    .map_err(|e| FuzzError::ThreadPool(e.to_string()))?;
                Ok(pool.install(run))
            }
            None => Ok(run()),
        }
    }
}

/// Split `0..rows` into consecutive ranges of at most `chunk_size`.
fn chunk_ranges(rows: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..rows)
        .step_by(chunk_size.max(1))
        .map(|start| start..(start + chunk_size).min(rows))
        .collect()
}

fn report_failures<T>(mode: &'static str, results: &[RowResult<T>]) {
    let mut by_kind: AHashMap<&'static str, usize> = AHashMap::new();
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        *by_kind.entry(RowStatus::from(err).as_str()).or_insert(0) += 1;
    }

    let failed: usize = by_kind.values().sum();
    if failed > 0 {
        warn!(mode, failed, kinds = ?by_kind, "rows failed");
    }
    info!(mode, rows = results.len(), failed, "batch complete");
}
