//! fuzzytab - String similarity for tabular data
//!
//! A library of fuzzy string matching algorithms plus batch evaluation over
//! whole columns, for hosts that hand over rows of text and want one score
//! (or one best match) back per row.
//!
//! # Features
//! - Edit distances (Levenshtein, OSA, Hamming, Indel, LCS) and their 0-100
//!   normalized similarities
//! - Jaro and Jaro-Winkler
//! - The ratio family (ratio, partial, token sort/set, WRatio, QRatio)
//! - Best-match search with exact length-bound pruning
//! - Parallel batch processing with deterministic row order
//! - Unicode support (lengths and edits count chars, not bytes)
//!
//! # Example
//!
//! ```
//! use fuzzytab::{BatchConfig, BatchEvaluator, Scorer};
//!
//! let scorer = Scorer::from_name("token_sort").unwrap();
//! let eval = BatchEvaluator::new(scorer, BatchConfig::default()).unwrap();
//!
//! let scores = eval
//!     .pairwise(&["hello world", "fuzzy wuzzy"], &["world hello", "wuzzy fuzzy was a bear"])
//!     .unwrap();
//! assert_eq!(scores[0].unwrap().value(), 100.0);
//!
//! let matches = eval.best_match(&["new york mets"], &["new york yankees", "mets new york"]).unwrap();
//! assert_eq!(matches[0].unwrap().index, 1);
//! ```

pub mod algorithms;
pub mod batch;
pub mod error;
pub mod protocol;
pub mod scoring;
pub mod search;

// Column adapters (enabled with the polars feature)
#[cfg(feature = "polars")]
pub mod polars;

pub use algorithms::{EditDistance, FallibleEditDistance, Similarity};
pub use batch::{BatchConfig, BatchEvaluator, RowResult, TextCell};
pub use error::{FuzzError, Result, RowError};
pub use protocol::{Invocation, MatchRow, Mode, PairRow, Response, RowStatus, Rows};
pub use scoring::{Method, Score, ScoreKind, ScoreOptions, Scorer};
pub use search::{best_match, BestMatch, ReferenceSet};
