//! Shared utilities for the survey dashboard crates.
//!
//! This crate provides the "try numeric, else keep text" coercion helpers
//! used by ingestion, labeling and tabulation on top of Polars `AnyValue`s.

pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use self::polars::{
    any_is_missing, any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty,
    format_numeric, parse_f64, parse_i64, round_to,
};
