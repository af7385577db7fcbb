//! Small helpers for reading survey frames cell by cell.

use std::collections::HashSet;

use polars::prelude::{AnyValue, Column, DataFrame, DataType};
use survey_common::{any_is_missing, any_to_f64, any_to_string};

use crate::ordering::sort_labels;

/// Number of values preselected in a filter.
pub const DEFAULT_SELECTION_LEN: usize = 5;

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

pub(crate) fn cells(column: &Column) -> impl Iterator<Item = AnyValue<'_>> {
    (0..column.len()).map(move |idx| column.get(idx).unwrap_or(AnyValue::Null))
}

/// Text form of every cell, `None` where the cell is missing.
pub(crate) fn text_keys(column: &Column) -> Vec<Option<String>> {
    cells(column)
        .map(|value| (!any_is_missing(&value)).then(|| any_to_string(value)))
        .collect()
}

/// Weight per row, with missing or non-numeric weights counted as zero.
/// `None` when no weight is requested or the column is absent.
pub(crate) fn weight_values(df: &DataFrame, weight: Option<&str>) -> Option<Vec<f64>> {
    let column = df.column(weight?).ok()?;
    Some(cells(column).map(|value| any_to_f64(value).unwrap_or(0.0)).collect())
}

pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Sorted distinct non-missing values of a column, as text.
pub fn distinct_values(df: &DataFrame, column: &str) -> Vec<String> {
    let Ok(column) = df.column(column) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut values: Vec<String> = text_keys(column)
        .into_iter()
        .flatten()
        .filter(|value| seen.insert(value.clone()))
        .collect();
    sort_labels(&mut values);
    values
}

pub fn distinct_count(df: &DataFrame, column: &str) -> usize {
    df.column(column)
        .map(|column| {
            text_keys(column)
                .into_iter()
                .flatten()
                .collect::<HashSet<_>>()
                .len()
        })
        .unwrap_or(0)
}

/// The values a filter starts with: the first few in sorted order.
pub fn default_selection(values: &[String]) -> Vec<String> {
    values.iter().take(DEFAULT_SELECTION_LEN).cloned().collect()
}
