//! Regression tests against the CSV fixtures in `tests/data`
//!
//! `pairwise.csv` has columns `str1,str2` followed by one column per method,
//! each value rounded to 4 decimals. A Hamming-style value of `-1` marks a
//! length mismatch. The `match_expected_<method>.csv` tables hold the best
//! reference for every row of `match_master.csv`.

use std::path::PathBuf;

use fuzzytab::{BatchConfig, BatchEvaluator, Method, RowError, Score, Scorer};
use serde::Deserialize;

const TOLERANCE: f64 = 1e-3;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

fn read_column(name: &str) -> Vec<String> {
    let mut reader = csv::Reader::from_path(data_path(name)).unwrap();
    reader
        .records()
        .map(|record| record.unwrap()[0].to_string())
        .collect()
}

#[derive(Debug, Deserialize)]
struct ExpectedMatch {
    master: String,
    best_match: String,
    index: usize,
    score: f64,
}

#[test]
fn pairwise_fixture_matches_every_method() {
    let mut reader = csv::Reader::from_path(data_path("pairwise.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "str1");
    assert_eq!(&headers[1], "str2");

    let methods: Vec<Method> = headers.iter().skip(2).map(|h| h.parse().unwrap()).collect();
    assert!(methods.len() >= 10);

    let mut rows = 0;
    for record in reader.records() {
        let record = record.unwrap();
        let (s1, s2) = (&record[0], &record[1]);
        for (offset, method) in methods.iter().enumerate() {
            let expected: f64 = record[offset + 2].parse().unwrap();
            let scorer = Scorer::from_name(method.name()).unwrap();
            let actual = scorer.score(s1, s2);

            if expected == -1.0 {
                assert!(
                    matches!(actual, Err(RowError::LengthMismatch { .. })),
                    "{method}({s1:?}, {s2:?}) should be a length mismatch, got {actual:?}"
                );
                continue;
            }

            let actual = actual.unwrap();
            assert_eq!(actual.kind(), method.kind());
            assert!(
                (actual.value() - expected).abs() < TOLERANCE,
                "{method}({s1:?}, {s2:?}) = {actual}, expected {expected}"
            );
        }
        rows += 1;
    }
    assert!(rows > 20);
}

#[test]
fn pairwise_fixture_through_batch_evaluator() {
    let mut reader = csv::Reader::from_path(data_path("pairwise.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    let column = headers.iter().position(|h| h == "jaro_winkler").unwrap();

    let (mut left, mut right, mut expected) = (Vec::new(), Vec::new(), Vec::new());
    for record in reader.records() {
        let record = record.unwrap();
        left.push(record[0].to_string());
        right.push(record[1].to_string());
        expected.push(record[column].parse::<f64>().unwrap());
    }

    let config = BatchConfig {
        workers: Some(2),
        chunk_size: 4,
    };
    let eval = BatchEvaluator::new(Scorer::from_name("jaro_winkler").unwrap(), config).unwrap();
    let scores = eval.pairwise(&left, &right).unwrap();

    assert_eq!(scores.len(), expected.len());
    for (score, expected) in scores.iter().zip(&expected) {
        let Ok(Score::Similarity(value)) = score else {
            panic!("unexpected row result {score:?}");
        };
        assert!((value - expected).abs() < TOLERANCE);
    }
}

#[test]
fn best_match_fixtures() {
    let masters = read_column("match_master.csv");
    let references = read_column("match_reference.csv");

    for method in ["ratio", "jaro_winkler", "token_set", "levenshtein"] {
        let path = data_path(&format!("match_expected_{method}.csv"));
        let mut reader = csv::Reader::from_path(path).unwrap();
        let expected: Vec<ExpectedMatch> = reader.deserialize().map(|row| row.unwrap()).collect();
        assert_eq!(expected.len(), masters.len());

        let eval = BatchEvaluator::new(Scorer::from_name(method).unwrap(), BatchConfig::default())
            .unwrap();
        let found = eval.best_match(&masters, &references).unwrap();

        for ((master, row), want) in masters.iter().zip(&found).zip(&expected) {
            assert_eq!(master, &want.master);
            let row = row.unwrap();
            assert_eq!(
                references[row.index], want.best_match,
                "{method}: best match for {master:?}"
            );
            assert_eq!(row.index, want.index);
            assert!((row.score.value() - want.score).abs() < TOLERANCE);
        }
    }
}
