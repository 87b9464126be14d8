//! Scoring dispatcher
//!
//! Maps a method identifier plus [`ScoreOptions`] onto one algorithm with the
//! uniform signature `(&str, &str) -> Result<Score, RowError>`.
//!
//! # Enum-based Algorithm Dispatch
//!
//! The method table is a closed enum matched exhaustively, so adding a method
//! is a compile-checked change instead of a registry entry, and the compiler
//! can inline the algorithm at each call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::algorithms::{
    fuzz, jaro, normalize::fold_case, EditDistance, FallibleEditDistance, Hamming, Indel, Jaro,
    JaroWinkler, Levenshtein, LcsSeq, Osa, Similarity,
};
use crate::error::{FuzzError, Result, RowError};

/// Whether a method reports similarity (higher is better) or distance
/// (lower is better).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Similarity,
    Distance,
}

/// Result of scoring one pair.
///
/// The two families are never mixed: a distance method always yields
/// [`Score::Distance`] and a similarity method [`Score::Similarity`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    /// 0 to 100, higher is more similar
    Similarity(f64),
    /// Edit count, lower is more similar
    Distance(usize),
}

impl Score {
    #[must_use]
    pub fn kind(&self) -> ScoreKind {
        match self {
            Self::Similarity(_) => ScoreKind::Similarity,
            Self::Distance(_) => ScoreKind::Distance,
        }
    }

    /// Numeric value as handed back to the host.
    #[must_use]
    pub fn value(&self) -> f64 {
        match *self {
            Self::Similarity(s) => s,
            Self::Distance(d) => d as f64,
        }
    }

    /// True if `self` is strictly better than `other` under the shared kind.
    #[must_use]
    pub fn beats(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Similarity(a), Self::Similarity(b)) => a > b,
            (Self::Distance(a), Self::Distance(b)) => a < b,
            _ => false,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Similarity(s) => write!(f, "{s:.4}"),
            Self::Distance(d) => write!(f, "{d}"),
        }
    }
}

/// The method table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    Ratio,
    PartialRatio,
    TokenSort,
    PartialTokenSort,
    TokenSet,
    PartialTokenSet,
    TokenRatio,
    PartialTokenRatio,
    WRatio,
    QRatio,
    Jaro,
    JaroWinkler,
    NormalizedLevenshtein,
    NormalizedOsa,
    NormalizedHamming,
    NormalizedIndel,
    NormalizedLcsSeq,
    Levenshtein,
    Osa,
    Hamming,
    Indel,
    LcsSeq,
}

impl Method {
    /// Every method, in table order.
    pub const ALL: [Method; 22] = [
        Self::Ratio,
        Self::PartialRatio,
        Self::TokenSort,
        Self::PartialTokenSort,
        Self::TokenSet,
        Self::PartialTokenSet,
        Self::TokenRatio,
        Self::PartialTokenRatio,
        Self::WRatio,
        Self::QRatio,
        Self::Jaro,
        Self::JaroWinkler,
        Self::NormalizedLevenshtein,
        Self::NormalizedOsa,
        Self::NormalizedHamming,
        Self::NormalizedIndel,
        Self::NormalizedLcsSeq,
        Self::Levenshtein,
        Self::Osa,
        Self::Hamming,
        Self::Indel,
        Self::LcsSeq,
    ];

    /// Canonical identifier.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ratio => "ratio",
            Self::PartialRatio => "partial_ratio",
            Self::TokenSort => "token_sort",
            Self::PartialTokenSort => "partial_token_sort",
            Self::TokenSet => "token_set",
            Self::PartialTokenSet => "partial_token_set",
            Self::TokenRatio => "token_ratio",
            Self::PartialTokenRatio => "partial_token_ratio",
            Self::WRatio => "wratio",
            Self::QRatio => "qratio",
            Self::Jaro => "jaro",
            Self::JaroWinkler => "jaro_winkler",
            Self::NormalizedLevenshtein => "normalized_levenshtein",
            Self::NormalizedOsa => "norm_osa",
            Self::NormalizedHamming => "norm_hamming",
            Self::NormalizedIndel => "norm_indel",
            Self::NormalizedLcsSeq => "norm_lcsseq",
            Self::Levenshtein => "levenshtein",
            Self::Osa => "osa",
            Self::Hamming => "hamming",
            Self::Indel => "indel",
            Self::LcsSeq => "lcsseq",
        }
    }

    #[must_use]
    pub fn kind(&self) -> ScoreKind {
        match self {
            Self::Levenshtein | Self::Osa | Self::Hamming | Self::Indel | Self::LcsSeq => {
                ScoreKind::Distance
            }
            _ => ScoreKind::Similarity,
        }
    }

    /// Methods that can reject a pair outright.
    #[must_use]
    pub fn is_fallible(&self) -> bool {
        matches!(self, Self::Hamming | Self::NormalizedHamming)
    }
}

impl FromStr for Method {
    type Err = FuzzError;

    fn from_str(s: &str) -> Result<Self> {
        let method = match s.trim().to_lowercase().as_str() {
            "ratio" => Self::Ratio,
            "partial_ratio" => Self::PartialRatio,
            "token_sort" | "token_sort_ratio" => Self::TokenSort,
            "partial_token_sort" => Self::PartialTokenSort,
            "token_set" | "token_set_ratio" => Self::TokenSet,
            "partial_token_set" => Self::PartialTokenSet,
            "token_ratio" => Self::TokenRatio,
            "partial_token_ratio" => Self::PartialTokenRatio,
            "wratio" => Self::WRatio,
            "qratio" => Self::QRatio,
            "jaro" => Self::Jaro,
            "jaro_winkler" => Self::JaroWinkler,
            "normalized_levenshtein" | "norm_lev" => Self::NormalizedLevenshtein,
            "norm_osa" => Self::NormalizedOsa,
            "norm_hamming" => Self::NormalizedHamming,
            "norm_indel" => Self::NormalizedIndel,
            "norm_lcsseq" => Self::NormalizedLcsSeq,
            "levenshtein" => Self::Levenshtein,
            "osa" => Self::Osa,
            "hamming" => Self::Hamming,
            "indel" => Self::Indel,
            "lcsseq" => Self::LcsSeq,
            _ => return Err(FuzzError::UnsupportedMethod(s.to_string())),
        };
        Ok(method)
    }
}

impl TryFrom<String> for Method {
    type Error = FuzzError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.name().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Method-specific knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreOptions {
    /// Lower-case both inputs before scoring
    pub case_insensitive: bool,
    /// Jaro-Winkler prefix weight, in `[0.0, 0.25]`
    pub prefix_weight: f64,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            prefix_weight: jaro::DEFAULT_PREFIX_WEIGHT,
        }
    }
}

impl ScoreOptions {
    /// Reject option values the algorithms cannot honor.
    pub fn validate(&self) -> Result<()> {
        if !self.prefix_weight.is_finite() || !(0.0..=0.25).contains(&self.prefix_weight) {
            return Err(FuzzError::InvalidOption {
                name: "prefix_weight",
                reason: format!(
                    "must be in range [0.0, 0.25], got {} (values > 0.25 can produce scores > 100)",
                    self.prefix_weight
                ),
            });
        }
        Ok(())
    }
}

/// A method bound to its options: the uniform scoring function.
///
/// Stateless and `Copy`, so it can be shared freely across worker threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorer {
    method: Method,
    options: ScoreOptions,
}

impl Scorer {
    /// Bind a method to validated options.
    pub fn new(method: Method, options: ScoreOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { method, options })
    }

    /// Parse a method identifier and bind default options.
    ///
    /// ```
    /// use fuzzytab::{Score, Scorer};
    ///
    /// let scorer = Scorer::from_name("levenshtein").unwrap();
    /// assert_eq!(scorer.score("kitten", "sitting"), Ok(Score::Distance(3)));
    /// assert!(Scorer::from_name("soundex").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Self> {
        Self::new(name.parse()?, ScoreOptions::default())
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub fn options(&self) -> ScoreOptions {
        self.options
    }

    #[must_use]
    pub fn kind(&self) -> ScoreKind {
        self.method.kind()
    }

    /// Score one pair.
    pub fn score(&self, a: &str, b: &str) -> std::result::Result<Score, RowError> {
        let a = fold_case(a, self.options.case_insensitive);
        let b = fold_case(b, self.options.case_insensitive);
        self.score_prepared(&a, &b)
    }

    /// Score a pair whose case folding has already been applied.
    pub(crate) fn score_prepared(&self, a: &str, b: &str) -> std::result::Result<Score, RowError> {
        let score = match self.method {
            Method::Ratio => Score::Similarity(fuzz::ratio(a, b)),
            Method::PartialRatio => Score::Similarity(fuzz::partial_ratio(a, b)),
            Method::TokenSort => Score::Similarity(fuzz::token_sort_ratio(a, b)),
            Method::PartialTokenSort => Score::Similarity(fuzz::partial_token_sort_ratio(a, b)),
            Method::TokenSet => Score::Similarity(fuzz::token_set_ratio(a, b)),
            Method::PartialTokenSet => Score::Similarity(fuzz::partial_token_set_ratio(a, b)),
            Method::TokenRatio => Score::Similarity(fuzz::token_ratio(a, b)),
            Method::PartialTokenRatio => Score::Similarity(fuzz::partial_token_ratio(a, b)),
            Method::WRatio => Score::Similarity(fuzz::wratio(a, b)),
            Method::QRatio => Score::Similarity(fuzz::qratio(a, b)),
            Method::Jaro => Score::Similarity(Jaro::new().similarity(a, b)),
            Method::JaroWinkler => Score::Similarity(
                JaroWinkler::new()
                    .with_prefix_weight(self.options.prefix_weight)
                    .similarity(a, b),
            ),
            Method::NormalizedLevenshtein => Score::Similarity(Levenshtein::new().normalized(a, b)),
            Method::NormalizedOsa => Score::Similarity(Osa::new().normalized(a, b)),
            Method::NormalizedHamming => Score::Similarity(Hamming::new().normalized(a, b)?),
            Method::NormalizedIndel => Score::Similarity(Indel::new().normalized(a, b)),
            Method::NormalizedLcsSeq => Score::Similarity(LcsSeq::new().normalized(a, b)),
            Method::Levenshtein => {
                Score::Distance(EditDistance::distance(&Levenshtein::new(), a, b))
            }
            Method::Osa => Score::Distance(EditDistance::distance(&Osa::new(), a, b)),
            Method::Hamming => {
                Score::Distance(FallibleEditDistance::distance(&Hamming::new(), a, b)?)
            }
            Method::Indel => Score::Distance(EditDistance::distance(&Indel::new(), a, b)),
            Method::LcsSeq => Score::Distance(EditDistance::distance(&LcsSeq::new(), a, b)),
        };
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_names() {
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>(), Ok(method));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("norm_lev".parse::<Method>(), Ok(Method::NormalizedLevenshtein));
        assert_eq!("Token_Set".parse::<Method>(), Ok(Method::TokenSet));
    }

    #[test]
    fn test_unknown_method() {
        assert_eq!(
            "soundex".parse::<Method>(),
            Err(FuzzError::UnsupportedMethod("soundex".into()))
        );
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Method::Levenshtein.kind(), ScoreKind::Distance);
        assert_eq!(Method::Hamming.kind(), ScoreKind::Distance);
        assert_eq!(Method::NormalizedLevenshtein.kind(), ScoreKind::Similarity);
        assert_eq!(Method::TokenSet.kind(), ScoreKind::Similarity);
    }

    #[test]
    fn test_scores_match_kind() {
        for method in Method::ALL {
            let scorer = Scorer::new(method, ScoreOptions::default()).unwrap();
            let score = scorer.score("hello", "hallo").unwrap();
            assert_eq!(score.kind(), method.kind(), "{method}");
        }
    }

    #[test]
    fn test_hamming_mismatch_is_row_error() {
        let scorer = Scorer::from_name("hamming").unwrap();
        assert_eq!(
            scorer.score("abc", "ab"),
            Err(RowError::LengthMismatch { left: 3, right: 2 })
        );
        assert_eq!(scorer.score("abc", "abd"), Ok(Score::Distance(1)));
    }

    #[test]
    fn test_case_insensitive_option() {
        let options = ScoreOptions {
            case_insensitive: true,
            ..ScoreOptions::default()
        };
        let scorer = Scorer::new(Method::Ratio, options).unwrap();
        assert_eq!(scorer.score("JOHN SMITH", "john smith"), Ok(Score::Similarity(100.0)));
        let strict = Scorer::from_name("ratio").unwrap();
        assert_eq!(strict.score("ABC", "abc"), Ok(Score::Similarity(0.0)));
    }

    #[test]
    fn test_prefix_weight_validation() {
        let options = ScoreOptions {
            prefix_weight: 0.3,
            ..ScoreOptions::default()
        };
        assert!(matches!(
            Scorer::new(Method::JaroWinkler, options),
            Err(FuzzError::InvalidOption { name: "prefix_weight", .. })
        ));
        let nan = ScoreOptions {
            prefix_weight: f64::NAN,
            ..ScoreOptions::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_jaro_winkler_uses_configured_prefix_weight() {
        let options = ScoreOptions {
            prefix_weight: 0.2,
            ..ScoreOptions::default()
        };
        let heavy = Scorer::new(Method::JaroWinkler, options).unwrap();
        let expected = jaro::jaro_winkler_similarity_params("MARTHA", "MARHTA", 0.2);
        assert_eq!(heavy.score("MARTHA", "MARHTA"), Ok(Score::Similarity(expected)));

        let default = Scorer::from_name("jaro_winkler").unwrap();
        let boosted = heavy.score("MARTHA", "MARHTA").unwrap();
        assert!(boosted.beats(&default.score("MARTHA", "MARHTA").unwrap()));
        assert_eq!(
            Scorer::from_name("jaro").unwrap().score("DWAYNE", "DUANE"),
            Ok(Score::Similarity(jaro::jaro_similarity("DWAYNE", "DUANE")))
        );
    }

    #[test]
    fn test_score_beats() {
        assert!(Score::Similarity(90.0).beats(&Score::Similarity(80.0)));
        assert!(!Score::Similarity(80.0).beats(&Score::Similarity(80.0)));
        assert!(Score::Distance(1).beats(&Score::Distance(2)));
        assert!(!Score::Distance(1).beats(&Score::Similarity(0.0)));
    }

    #[test]
    fn test_method_serde() {
        let method: Method = serde_json::from_str("\"jaro_winkler\"").unwrap();
        assert_eq!(method, Method::JaroWinkler);
        assert_eq!(serde_json::to_string(&Method::TokenSet).unwrap(), "\"token_set\"");
        assert!(serde_json::from_str::<Method>("\"nope\"").is_err());
    }
}
