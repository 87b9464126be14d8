//! Column adapters for Polars string Series
//!
//! Enabled with the `polars` feature. These run an [`Invocation`] directly
//! over Polars string columns, iterating Arrow chunks instead of
//! materializing owned strings per row.
//!
//! - `similarity_series`: pairwise scores of two string columns
//! - `best_match_frame`: best reference for each master row
//!
//! Null cells propagate: a null on either side of a pair, or a null master,
//! yields null outputs. Null references are never matched.
//!
//! [`Invocation`]: crate::protocol::Invocation

pub mod expressions;

pub use expressions::*;
