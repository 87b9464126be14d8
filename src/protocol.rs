//! Host command/result protocol
//!
//! The host invokes the library with a method, a mode and options, either as
//! a JSON payload or as the argv-style command line of the original plugin:
//!
//! ```text
//! pairwise <method> [nocase] [pw=<x>]
//! match <method> <n_master> <n_ref> [nocase] [pw=<x>]
//! ```
//!
//! Results come back as one row per input row, in input order. Failed rows
//! carry a sentinel value plus a [`RowStatus`] so callers can filter them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::batch::{BatchConfig, BatchEvaluator, RowResult, TextCell};
use crate::error::{FuzzError, Result, RowError};
use crate::scoring::{Method, Score, ScoreOptions, Scorer};
use crate::search::BestMatch;

/// Score written for rows that failed.
pub const SENTINEL_SCORE: f64 = -1.0;

/// What the host asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Score row-aligned column pairs
    Pairwise,
    /// Find the best reference for each master row
    #[serde(alias = "match")]
    BestMatch,
}

impl FromStr for Mode {
    type Err = FuzzError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pairwise" => Ok(Self::Pairwise),
            "best_match" | "match" => Ok(Self::BestMatch),
            _ => Err(FuzzError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pairwise => "pairwise",
            Self::BestMatch => "best_match",
        })
    }
}

/// Row counts of a single column holding master rows followed by
/// reference rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackedCounts {
    pub n_master: usize,
    pub n_ref: usize,
}

/// Split a stacked column into `(masters, references)`.
///
/// ```
/// use fuzzytab::protocol::{split_stacked_column, StackedCounts};
///
/// let column = ["acme", "globex", "Acme Corp", "Globex Inc", "Initech"];
/// let counts = StackedCounts { n_master: 2, n_ref: 3 };
/// let (masters, refs) = split_stacked_column(&column, counts).unwrap();
/// assert_eq!(masters, ["acme", "globex"]);
/// assert_eq!(refs.len(), 3);
/// ```
pub fn split_stacked_column<C>(column: &[C], counts: StackedCounts) -> Result<(&[C], &[C])> {
    let expected = counts.n_master.checked_add(counts.n_ref);
    if expected != Some(column.len()) {
        return Err(FuzzError::MalformedCommand(format!(
            "column has {} rows but n_master + n_ref = {} + {}",
            column.len(),
            counts.n_master,
            counts.n_ref
        )));
    }
    Ok(column.split_at(counts.n_master))
}

/// One fully parsed and validated host call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Invocation {
    pub method: Method,
    pub mode: Mode,
    pub options: ScoreOptions,
    pub batch: BatchConfig,
    /// Present when master and reference rows share one column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacked: Option<StackedCounts>,
}

#[derive(Deserialize)]
struct RawInvocation {
    method: String,
    mode: String,
    #[serde(default)]
    options: ScoreOptions,
    #[serde(default)]
    batch: BatchConfig,
    #[serde(default)]
    stacked: Option<StackedCounts>,
}

impl Invocation {
    /// Build and validate an invocation.
    pub fn new(
        method: Method,
        mode: Mode,
        options: ScoreOptions,
        batch: BatchConfig,
    ) -> Result<Self> {
        options.validate()?;
        batch.validate()?;
        Ok(Self {
            method,
            mode,
            options,
            batch,
            stacked: None,
        })
    }

    /// Parse a JSON payload.
    ///
    /// ```
    /// use fuzzytab::protocol::{Invocation, Mode};
    ///
    /// let inv = Invocation::from_json(
    ///     r#"{"method": "jaro_winkler", "mode": "match", "options": {"prefix_weight": 0.2}}"#,
    /// ).unwrap();
    /// assert_eq!(inv.mode, Mode::BestMatch);
    /// assert_eq!(inv.options.prefix_weight, 0.2);
    /// ```
    pub fn from_json(payload: &str) -> Result<Self> {
        let raw: RawInvocation =
            serde_json::from_str(payload).map_err(|e| FuzzError::MalformedCommand(e.to_string()))?;
        let method: Method = raw.method.parse()?;
        let mode: Mode = raw.mode.parse()?;
        let mut invocation = Self::new(method, mode, raw.options, raw.batch)?;
        invocation.stacked = raw.stacked;
        Ok(invocation)
    }

    /// Parse the plugin's argv form.
    ///
    /// ```
    /// use fuzzytab::protocol::{Invocation, Mode};
    ///
    /// let inv = Invocation::from_args(&["match", "token_set", "10", "250", "nocase"]).unwrap();
    /// assert_eq!(inv.mode, Mode::BestMatch);
    /// assert!(inv.options.case_insensitive);
    /// assert_eq!(inv.stacked.unwrap().n_ref, 250);
    /// ```
    pub fn from_args(args: &[&str]) -> Result<Self> {
        let (mode, rest) = args.split_first().ok_or_else(|| {
            FuzzError::MalformedCommand("requires mode (pairwise or match)".into())
        })?;
        let mode: Mode = mode.parse()?;

        let (method, rest) = rest
            .split_first()
            .ok_or_else(|| FuzzError::MalformedCommand(format!("{mode} requires a method")))?;
        let method: Method = method.parse()?;

        let (stacked, flags) = match mode {
            Mode::Pairwise => (None, rest),
            Mode::BestMatch => {
                let [n_master, n_ref, flags @ ..] = rest else {
                    return Err(FuzzError::MalformedCommand(
                        "match requires method, n_master, n_ref".into(),
                    ));
                };
                let counts = StackedCounts {
                    n_master: parse_count("n_master", n_master)?,
                    n_ref: parse_count("n_ref", n_ref)?,
                };
                (Some(counts), flags)
            }
        };

        let mut options = ScoreOptions::default();
        for flag in flags {
            if *flag == "nocase" {
                options.case_insensitive = true;
            } else if let Some(value) = flag.strip_prefix("pw=") {
                options.prefix_weight = value.parse().map_err(|_| FuzzError::InvalidOption {
                    name: "pw",
                    reason: format!("'{value}' is not a number"),
                })?;
            } else {
                return Err(FuzzError::MalformedCommand(format!("unrecognized option '{flag}'")));
            }
        }

        let mut invocation = Self::new(method, mode, options, BatchConfig::default())?;
        invocation.stacked = stacked;
        Ok(invocation)
    }

    /// Replace the scheduling knobs.
    pub fn with_batch(mut self, batch: BatchConfig) -> Result<Self> {
        batch.validate()?;
        self.batch = batch;
        Ok(self)
    }

    pub fn scorer(&self) -> Result<Scorer> {
        Scorer::new(self.method, self.options)
    }

    pub fn evaluator(&self) -> Result<BatchEvaluator> {
        BatchEvaluator::new(self.scorer()?, self.batch)
    }

    /// Run the invocation over two columns.
    ///
    /// In pairwise mode the columns are the left and right strings; in
    /// best-match mode they are the master and reference lists.
    ///
    /// ```
    /// use fuzzytab::protocol::{Invocation, Rows, RowStatus};
    ///
    /// let inv = Invocation::from_args(&["pairwise", "hamming"]).unwrap();
    /// let response = inv.execute(&["karolin", "abc"], &["kathrin", "ab"]).unwrap();
    /// let Rows::Pairwise(rows) = response.rows else { unreachable!() };
    /// assert_eq!(rows[0].score, 3.0);
    /// assert_eq!(rows[1].score, -1.0);
    /// assert_eq!(rows[1].status, RowStatus::LengthMismatch);
    /// assert_eq!(response.failed, 1);
    /// ```
    pub fn execute<A, B>(&self, first: &[A], second: &[B]) -> Result<Response>
    where
        A: TextCell,
        B: TextCell,
    {
        let evaluator = self.evaluator()?;
        let rows = match self.mode {
            Mode::Pairwise => {
                let results = evaluator.pairwise(first, second)?;
                Rows::Pairwise(results.into_iter().map(PairRow::from).collect())
            }
            Mode::BestMatch => {
                let results = evaluator.best_match(first, second)?;
                Rows::BestMatch(
                    results
                        .into_iter()
                        .map(|r| MatchRow::from_result(r, second))
                        .collect(),
                )
            }
        };
        Ok(Response::new(self.method, self.mode, rows))
    }

    /// Run a best-match invocation over one stacked column.
    pub fn execute_stacked<C: TextCell>(&self, column: &[C]) -> Result<Response> {
        if self.mode != Mode::BestMatch {
            return Err(FuzzError::MalformedCommand(
                "stacked columns are only valid in best_match mode".into(),
            ));
        }
        let counts = self.stacked.ok_or_else(|| {
            FuzzError::MalformedCommand("stacked column requires n_master and n_ref".into())
        })?;
        let (masters, references) = split_stacked_column(column, counts)?;
        self.execute(masters, references)
    }
}

fn parse_count(name: &'static str, value: &str) -> Result<usize> {
    value.parse().map_err(|_| FuzzError::InvalidOption {
        name,
        reason: format!("'{value}' is not a row count"),
    })
}

/// Per-row outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Ok,
    LengthMismatch,
    EmptyReferenceList,
    EncodingError,
}

impl RowStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::LengthMismatch => "length_mismatch",
            Self::EmptyReferenceList => "empty_reference_list",
            Self::EncodingError => "encoding_error",
        }
    }
}

impl From<&RowError> for RowStatus {
    fn from(err: &RowError) -> Self {
        match err {
            RowError::LengthMismatch { .. } => Self::LengthMismatch,
            RowError::EmptyReferenceList => Self::EmptyReferenceList,
            RowError::EncodingError { .. } => Self::EncodingError,
        }
    }
}

/// One pairwise output row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairRow {
    pub score: f64,
    pub status: RowStatus,
}

impl From<RowResult<Score>> for PairRow {
    fn from(result: RowResult<Score>) -> Self {
        match result {
            Ok(score) => Self {
                score: score.value(),
                status: RowStatus::Ok,
            },
            Err(err) => Self {
                score: SENTINEL_SCORE,
                status: RowStatus::from(&err),
            },
        }
    }
}

/// One best-match output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    /// Winning reference text; empty on failure
    pub best_match: String,
    pub index: Option<usize>,
    pub score: f64,
    pub status: RowStatus,
}

impl MatchRow {
    pub(crate) fn from_result<R: TextCell>(result: RowResult<BestMatch>, references: &[R]) -> Self {
        match result {
            Ok(found) => Self {
                best_match: references
                    .get(found.index)
                    .and_then(TextCell::as_text)
                    .unwrap_or_default()
                    .to_string(),
                index: Some(found.index),
                score: found.score.value(),
                status: RowStatus::Ok,
            },
            Err(err) => Self {
                best_match: String::new(),
                index: None,
                score: SENTINEL_SCORE,
                status: RowStatus::from(&err),
            },
        }
    }
}

/// Output rows, shaped by mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rows {
    Pairwise(Vec<PairRow>),
    BestMatch(Vec<MatchRow>),
}

impl Rows {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Pairwise(rows) => rows.len(),
            Self::BestMatch(rows) => rows.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn failed(&self) -> usize {
        match self {
            Self::Pairwise(rows) => rows.iter().filter(|r| r.status != RowStatus::Ok).count(),
            Self::BestMatch(rows) => rows.iter().filter(|r| r.status != RowStatus::Ok).count(),
        }
    }
}

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub method: Method,
    pub mode: Mode,
    /// Rows whose status is not `ok`
    pub failed: usize,
    pub rows: Rows,
}

impl Response {
    fn new(method: Method, mode: Mode, rows: Rows) -> Self {
        Self {
            method,
            mode,
            failed: rows.failed(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("pairwise".parse::<Mode>(), Ok(Mode::Pairwise));
        assert_eq!("match".parse::<Mode>(), Ok(Mode::BestMatch));
        assert_eq!("best_match".parse::<Mode>(), Ok(Mode::BestMatch));
        assert_eq!(
            "cluster".parse::<Mode>(),
            Err(FuzzError::UnsupportedMode("cluster".into()))
        );
    }

    #[test]
    fn test_from_args_pairwise() {
        let inv = Invocation::from_args(&["pairwise", "jaro_winkler", "pw=0.2"]).unwrap();
        assert_eq!(inv.method, Method::JaroWinkler);
        assert_eq!(inv.mode, Mode::Pairwise);
        assert_eq!(inv.options.prefix_weight, 0.2);
        assert!(!inv.options.case_insensitive);
        assert_eq!(inv.stacked, None);
    }

    #[test]
    fn test_from_args_errors() {
        assert!(matches!(
            Invocation::from_args(&[]),
            Err(FuzzError::MalformedCommand(_))
        ));
        assert_eq!(
            Invocation::from_args(&["pairwise", "soundex"]),
            Err(FuzzError::UnsupportedMethod("soundex".into()))
        );
        assert!(matches!(
            Invocation::from_args(&["match", "ratio", "3"]),
            Err(FuzzError::MalformedCommand(_))
        ));
        assert!(matches!(
            Invocation::from_args(&["match", "ratio", "x", "3"]),
            Err(FuzzError::InvalidOption { name: "n_master", .. })
        ));
        assert!(matches!(
            Invocation::from_args(&["pairwise", "jaro_winkler", "pw=0.5"]),
            Err(FuzzError::InvalidOption { name: "prefix_weight", .. })
        ));
        assert!(matches!(
            Invocation::from_args(&["pairwise", "ratio", "fast"]),
            Err(FuzzError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let inv = Invocation::from_json(
            r#"{"method": "norm_lev", "mode": "pairwise", "batch": {"workers": 2}}"#,
        )
        .unwrap();
        assert_eq!(inv.method, Method::NormalizedLevenshtein);
        assert_eq!(inv.batch.workers, Some(2));
        assert_eq!(inv.batch.chunk_size, crate::batch::DEFAULT_CHUNK_SIZE);

        assert_eq!(
            Invocation::from_json(r#"{"method": "soundex", "mode": "pairwise"}"#),
            Err(FuzzError::UnsupportedMethod("soundex".into()))
        );
        assert!(matches!(
            Invocation::from_json(r#"{"method": "ratio"}"#),
            Err(FuzzError::MalformedCommand(_))
        ));
        let zero_chunk = r#"{"method": "ratio", "mode": "pairwise", "batch": {"chunk_size": 0}}"#;
        assert!(matches!(
            Invocation::from_json(zero_chunk),
            Err(FuzzError::InvalidOption { name: "chunk_size", .. })
        ));
    }

    #[test]
    fn test_split_stacked_column() {
        let column = ["a", "b", "c"];
        let counts = StackedCounts { n_master: 1, n_ref: 2 };
        let (m, r) = split_stacked_column(&column, counts).unwrap();
        assert_eq!(m, ["a"]);
        assert_eq!(r, ["b", "c"]);

        let wrong = StackedCounts { n_master: 2, n_ref: 2 };
        assert!(split_stacked_column(&column, wrong).is_err());
    }

    #[test]
    fn test_execute_best_match_rows() {
        let inv = Invocation::from_args(&["match", "token_set", "2", "3"]).unwrap();
        let column = ["Gogle", "Microsft", "Microsoft Corp", "Google LLC", "Google Inc"];
        let response = inv.execute_stacked(&column).unwrap();
        assert_eq!(response.failed, 0);
        let Rows::BestMatch(rows) = response.rows else {
            panic!("expected best-match rows");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows[0].best_match.starts_with("Google"));
        assert_eq!(rows[1].best_match, "Microsoft Corp");
        assert_eq!(rows[1].index, Some(0));
        assert_eq!(rows[1].status, RowStatus::Ok);
    }

    #[test]
    fn test_execute_best_match_sentinels() {
        let inv = Invocation::from_args(&["match", "hamming", "1", "1"]).unwrap();
        let response = inv.execute(&["abc"], &["abcd"]).unwrap();
        let Rows::BestMatch(rows) = response.rows else {
            panic!("expected best-match rows");
        };
        assert_eq!(
            rows[0],
            MatchRow {
                best_match: String::new(),
                index: None,
                score: SENTINEL_SCORE,
                status: RowStatus::LengthMismatch,
            }
        );
    }

    #[test]
    fn test_execute_best_match_malformed_master() {
        let inv = Invocation::from_json(r#"{"method": "ratio", "mode": "match"}"#).unwrap();
        let masters: Vec<Vec<u8>> = vec![vec![0xff], b"abd".to_vec()];
        let refs: Vec<Vec<u8>> = vec![b"abc".to_vec()];
        let response = inv.execute(&masters, &refs).unwrap();
        assert_eq!(response.failed, 1);
        let Rows::BestMatch(rows) = response.rows else {
            panic!("expected best-match rows");
        };
        assert_eq!(
            rows[0],
            MatchRow {
                best_match: String::new(),
                index: None,
                score: SENTINEL_SCORE,
                status: RowStatus::EncodingError,
            }
        );
        assert_eq!(rows[1].best_match, "abc");
        assert_eq!(rows[1].index, Some(0));
    }

    #[test]
    fn test_execute_stacked_requires_match_mode() {
        let inv = Invocation::from_args(&["pairwise", "ratio"]).unwrap();
        assert!(matches!(
            inv.execute_stacked(&["a", "b"]),
            Err(FuzzError::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_nocase_option() {
        let inv = Invocation::from_args(&["pairwise", "ratio", "nocase"]).unwrap();
        let response = inv.execute(&["HELLO"], &["hello"]).unwrap();
        let Rows::Pairwise(rows) = response.rows else {
            panic!("expected pairwise rows");
        };
        assert_eq!(rows[0].score, 100.0);
    }

    #[test]
    fn test_response_serializes() {
        let inv = Invocation::from_args(&["pairwise", "levenshtein"]).unwrap();
        let response = inv.execute(&["kitten"], &["sitting"]).unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["method"], "levenshtein");
        assert_eq!(json["mode"], "pairwise");
        assert_eq!(json["rows"][0]["score"], 3.0);
        assert_eq!(json["rows"][0]["status"], "ok");
    }
}
