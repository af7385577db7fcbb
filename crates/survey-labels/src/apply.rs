use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame, NamedFrom, PolarsResult, Series};
use survey_common::any_to_string;
use survey_model::ValueLabelMap;
use tracing::debug;

use crate::cell::any_to_cell;

/// Returns a copy of `df` with coded values replaced by their labels.
///
/// A column is rewritten only when at least one of its values has a label;
/// it then becomes a text column where unmapped values keep their own text
/// form. Row count, column order and nulls are preserved, and `df` itself is
/// left untouched.
pub fn apply_value_labels(
    df: &DataFrame,
    value_labels: &BTreeMap<String, ValueLabelMap>,
) -> PolarsResult<DataFrame> {
    let mut out = df.clone();
    for (variable, map) in value_labels {
        let Ok(column) = df.column(variable) else {
            continue;
        };
        let mut mapped = 0usize;
        let mut labeled: Vec<Option<String>> = Vec::with_capacity(column.len());
        for idx in 0..column.len() {
            let value = column.get(idx)?;
            if is_null_like(&value) {
                labeled.push(None);
                continue;
            }
            match map.lookup(&any_to_cell(&value)) {
                Some(label) => {
                    mapped += 1;
                    labeled.push(Some(label.to_string()));
                }
                None => labeled.push(Some(any_to_string(value))),
            }
        }
        if mapped == 0 {
            continue;
        }
        debug!(variable = %variable, mapped, rows = labeled.len(), "applied value labels");
        out.with_column(Series::new(variable.as_str().into(), labeled))?;
    }
    Ok(out)
}

fn is_null_like(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::Float64(v) => v.is_nan(),
        _ => false,
    }
}
