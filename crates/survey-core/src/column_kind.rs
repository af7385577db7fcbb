use std::collections::HashSet;

use polars::prelude::DataFrame;
use survey_model::ColumnKind;

use crate::frame::{column_names, is_numeric_dtype, text_keys};

/// Text columns with more distinct values than this, all unique, are identifiers.
pub const IDENTIFIER_MIN_DISTINCT: usize = 30;

/// Infers how a column is used from its type, name and content.
///
/// Numeric dtypes are numeric unless the name marks an identifier
/// (`id`, `id_*`, `*_id`). Text columns whose every value is unique and
/// which have many values are identifiers; other text is categorical.
pub fn infer_column_kind(df: &DataFrame, name: &str) -> Option<ColumnKind> {
    let column = df.column(name).ok()?;
    if is_numeric_dtype(column.dtype()) {
        return Some(if has_identifier_name(name) {
            ColumnKind::Identifier
        } else {
            ColumnKind::Numeric
        });
    }
    let present: Vec<String> = text_keys(column).into_iter().flatten().collect();
    let distinct: HashSet<&String> = present.iter().collect();
    if distinct.len() > IDENTIFIER_MIN_DISTINCT && distinct.len() == present.len() {
        Some(ColumnKind::Identifier)
    } else {
        Some(ColumnKind::Categorical)
    }
}

pub fn column_kinds(df: &DataFrame) -> Vec<(String, ColumnKind)> {
    column_names(df)
        .into_iter()
        .filter_map(|name| infer_column_kind(df, &name).map(|kind| (name, kind)))
        .collect()
}

fn has_identifier_name(name: &str) -> bool {
    let lower = name.trim().to_ascii_lowercase();
    lower == "id" || lower.starts_with("id_") || lower.ends_with("_id")
}
