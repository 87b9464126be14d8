//! Polars column implementations of pairwise scoring and best-match search
//!
//! Columns are read chunk by chunk with `downcast_iter()`; the rows are then
//! scored through the same [`BatchEvaluator`](crate::BatchEvaluator) chunked
//! pool as the slice API, so ordering and logging are identical.

use polars::prelude::*;

use crate::error::FuzzError;
use crate::protocol::{Invocation, MatchRow, PairRow, RowStatus};
use crate::search::ReferenceSet;

fn to_polars(err: FuzzError) -> PolarsError {
    PolarsError::ComputeError(err.to_string().into())
}

/// Chunk-aware read of a string column.
fn string_cells(series: &Series) -> PolarsResult<Vec<Option<&str>>> {
    let ca = series.str()?;
    Ok(ca.downcast_iter().flat_map(|chunk| chunk.iter()).collect())
}

/// Score two row-aligned string columns.
///
/// Returns a Float64 column named after `left`. Failed rows hold `-1.0`,
/// null inputs give null.
pub fn similarity_series(
    left: &Series,
    right: &Series,
    invocation: &Invocation,
) -> PolarsResult<Series> {
    if left.len() != right.len() {
        return Err(PolarsError::ShapeMismatch(
            format!(
                "pairwise columns must have equal length (left={}, right={})",
                left.len(),
                right.len()
            )
            .into(),
        ));
    }

    let lhs = string_cells(left)?;
    let rhs = string_cells(right)?;

    let evaluator = invocation.evaluator().map_err(to_polars)?;
    let scorer = evaluator.scorer();
    let scores = evaluator
        .map_rows(lhs.len(), |i| match (lhs[i], rhs[i]) {
            (Some(a), Some(b)) => Some(PairRow::from(scorer.score(a, b)).score),
            _ => None,
        })
        .map_err(to_polars)?;

    let out: Float64Chunked = scores.into_iter().collect();
    Ok(out.with_name(left.name().clone()).into_series())
}

/// Best reference for every master row.
///
/// Returns a frame with columns `best_match` (String), `index` (UInt64,
/// position in `references`), `score` (Float64) and `status` (String).
pub fn best_match_frame(
    masters: &Series,
    references: &Series,
    invocation: &Invocation,
) -> PolarsResult<DataFrame> {
    let master_cells = string_cells(masters)?;

    // Nulls are dropped from the search but indices still refer to the
    // original column.
    let (positions, texts): (Vec<usize>, Vec<&str>) = string_cells(references)?
        .into_iter()
        .enumerate()
        .filter_map(|(i, cell)| cell.map(|text| (i, text)))
        .unzip();

    let evaluator = invocation.evaluator().map_err(to_polars)?;
    let reference_set = ReferenceSet::new(&texts, evaluator.scorer());

    let rows: Vec<Option<MatchRow>> = evaluator
        .map_rows(master_cells.len(), |i| {
            master_cells[i].map(|master| {
                let mut row = MatchRow::from_result(reference_set.search(master), &texts);
                row.index = row.index.map(|found| positions[found]);
                row
            })
        })
        .map_err(to_polars)?;

    let best_match: Vec<Option<String>> = rows
        .iter()
        .map(|row| row.as_ref().map(|r| r.best_match.clone()))
        .collect();
    let index: Vec<Option<u64>> = rows
        .iter()
        .map(|row| row.as_ref().and_then(|r| r.index).map(|i| i as u64))
        .collect();
    let score: Vec<Option<f64>> = rows.iter().map(|row| row.as_ref().map(|r| r.score)).collect();
    let status: Vec<Option<&str>> = rows
        .iter()
        .map(|row| row.as_ref().map(|r| r.status.as_str()))
        .collect();

    DataFrame::new(vec![
        Series::new("best_match".into(), best_match).into_column(),
        Series::new("index".into(), index).into_column(),
        Series::new("score".into(), score).into_column(),
        Series::new("status".into(), status).into_column(),
    ])
}

/// Failed rows in a frame from [`best_match_frame`].
pub fn failed_rows(frame: &DataFrame) -> PolarsResult<usize> {
    let status = frame.column("status")?.as_materialized_series().str()?;
    Ok(status
        .downcast_iter()
        .flat_map(|chunk| chunk.iter())
        .filter(|s| matches!(s, Some(s) if *s != RowStatus::Ok.as_str()))
        .count())
}
