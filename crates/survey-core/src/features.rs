use polars::prelude::{Column, DataFrame, DataType, PolarsResult};
use tracing::debug;

use crate::candidates::head_sex_chain;

/// Derived column holding the sex of the household head.
pub const HEAD_SEX_COLUMN: &str = "sexo_jefatura";

/// Adds derived columns that are absent from `df`.
///
/// `sexo_jefatura` is copied from the first column the head-sex chain finds,
/// or added as an all-missing text column when nothing matches.
pub fn apply_derived_fields(df: &DataFrame) -> PolarsResult<DataFrame> {
    if df.column(HEAD_SEX_COLUMN).is_ok() {
        return Ok(df.clone());
    }
    let derived = match head_sex_chain().resolve(df) {
        Some(found) => {
            debug!(source = %found.column, strategy = %found.strategy, "derived {HEAD_SEX_COLUMN}");
            df.column(&found.column)?
                .clone()
                .with_name(HEAD_SEX_COLUMN.into())
        }
        None => {
            debug!("no household head sex column, {HEAD_SEX_COLUMN} left empty");
            Column::full_null(HEAD_SEX_COLUMN.into(), df.height(), &DataType::String)
        }
    };
    let mut out = df.clone();
    out.with_column(derived)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use survey_common::any_to_string;

    use super::*;

    #[test]
    fn copies_known_candidate() {
        let df = DataFrame::new(vec![
            Column::new("jefe_sexo".into(), ["Mujer", "Hombre"]),
            Column::new("sexo_jefe".into(), ["Hombre", "Hombre"]),
        ])
        .unwrap();
        let out = apply_derived_fields(&df).unwrap();
        let derived = out.column(HEAD_SEX_COLUMN).unwrap();
        assert_eq!(any_to_string(derived.get(0).unwrap()), "Hombre");
        assert_eq!(out.width(), 3);
        assert_eq!(df.width(), 2);
    }

    #[test]
    fn existing_column_is_kept() {
        let df = DataFrame::new(vec![Column::new(HEAD_SEX_COLUMN.into(), ["Mujer"])]).unwrap();
        let out = apply_derived_fields(&df).unwrap();
        assert_eq!(out.width(), 1);
    }

    #[test]
    fn missing_source_gives_empty_column() {
        let df = DataFrame::new(vec![Column::new("edad".into(), [30i64, 40])]).unwrap();
        let out = apply_derived_fields(&df).unwrap();
        let derived = out.column(HEAD_SEX_COLUMN).unwrap();
        assert_eq!(derived.null_count(), 2);
        assert_eq!(derived.dtype(), &DataType::String);
    }
}
