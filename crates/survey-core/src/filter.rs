//! Filtered views over a survey frame.

use std::collections::HashSet;
use std::str::FromStr;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray, PolarsResult};
use serde::{Deserialize, Serialize};
use survey_model::LabelMaps;
use tracing::debug;

use crate::candidates::key_filter_chain;
use crate::frame::{column_names, default_selection, distinct_count, distinct_values, text_keys};

/// Secondary filters offered next to the key filter.
pub const MAX_SECONDARY_FILTERS: usize = 3;

/// Keep rows whose `column` value is one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub column: String,
    pub values: Vec<String>,
}

impl FilterCriterion {
    pub fn new<I, S>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid filter '{input}': expected COLUMN=VALUE[,VALUE...]")]
pub struct FilterParseError {
    pub input: String,
}

/// Parses `COLUMN=V1,V2`.
impl FromStr for FilterCriterion {
    type Err = FilterParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || FilterParseError {
            input: input.to_string(),
        };
        let (column, values) = input.split_once('=').ok_or_else(err)?;
        let column = column.trim();
        if column.is_empty() {
            return Err(err());
        }
        let values = values
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty());
        Ok(Self::new(column, values))
    }
}

/// Ordered set of filter criteria. Applying it never modifies the input frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    criteria: Vec<FilterCriterion>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(FilterCriterion::new(column, values));
        self
    }

    pub fn push(&mut self, criterion: FilterCriterion) {
        self.criteria.push(criterion);
    }

    pub fn criteria(&self) -> &[FilterCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.iter().all(|criterion| criterion.values.is_empty())
    }

    pub fn selection(&self, column: &str) -> Option<&[String]> {
        self.criteria
            .iter()
            .find(|criterion| criterion.column == column)
            .map(|criterion| criterion.values.as_slice())
    }

    /// Returns the rows matching every criterion with a non-empty selection.
    ///
    /// Criteria on unknown columns are ignored. Missing cells never match.
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let mut keep = vec![true; df.height()];
        let mut active = 0usize;
        for criterion in &self.criteria {
            if criterion.values.is_empty() {
                continue;
            }
            let Ok(column) = df.column(&criterion.column) else {
                debug!(column = %criterion.column, "filter column not in view, ignored");
                continue;
            };
            active += 1;
            let selected: HashSet<&str> = criterion.values.iter().map(|v| v.trim()).collect();
            for (slot, key) in keep.iter_mut().zip(text_keys(column)) {
                *slot = *slot && key.is_some_and(|key| selected.contains(key.trim()));
            }
        }
        if active == 0 {
            return Ok(df.clone());
        }
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        let view = df.filter(&mask)?;
        debug!(criteria = active, rows = view.height(), "applied filters");
        Ok(view)
    }
}

/// Columns suited to secondary filtering: 2 to 10 distinct values, fewest
/// first, excluding the key column.
pub fn secondary_filter_candidates(df: &DataFrame, exclude: Option<&str>) -> Vec<String> {
    let mut candidates: Vec<(String, usize)> = column_names(df)
        .into_iter()
        .filter(|name| Some(name.as_str()) != exclude)
        .map(|name| {
            let count = distinct_count(df, &name);
            (name, count)
        })
        .filter(|(_, count)| (2..=10).contains(count))
        .collect();
    candidates.sort_by_key(|(_, count)| *count);
    candidates
        .into_iter()
        .take(MAX_SECONDARY_FILTERS)
        .map(|(name, _)| name)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryFilter {
    pub column: String,
    pub label: String,
    pub values: Vec<String>,
}

/// Everything a presentation layer needs to draw the filter controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub key_column: Option<String>,
    pub key_strategy: Option<String>,
    pub key_label: Option<String>,
    pub key_values: Vec<String>,
    pub default_selection: Vec<String>,
    /// Key values the secondary candidates were measured under.
    pub selection: Vec<String>,
    pub secondary: Vec<SecondaryFilter>,
}

/// Resolves the key filter column and offers secondary filters.
///
/// Secondary candidates and their values are measured on the rows left
/// after the key filter: `key_selection` when it is non-empty, otherwise
/// the default selection.
pub fn filter_options(
    df: &DataFrame,
    configured: Option<&str>,
    labels: &LabelMaps,
    key_selection: Option<&[String]>,
) -> PolarsResult<FilterOptions> {
    let key = key_filter_chain(configured).resolve(df);
    let key_values = key
        .as_ref()
        .map(|found| distinct_values(df, &found.column))
        .unwrap_or_default();
    let defaults = default_selection(&key_values);
    let selection = match key_selection {
        Some(chosen) if !chosen.is_empty() => chosen.to_vec(),
        _ => defaults.clone(),
    };
    let key_view = match &key {
        Some(found) => FilterSet::new()
            .with(found.column.as_str(), selection.iter().cloned())
            .apply(df)?,
        None => df.clone(),
    };
    let key_column = key.as_ref().map(|found| found.column.as_str());
    let secondary = secondary_filter_candidates(&key_view, key_column)
        .into_iter()
        .map(|column| SecondaryFilter {
            label: labels.variable_label(&column).to_string(),
            values: distinct_values(&key_view, &column),
            column,
        })
        .collect();
    Ok(FilterOptions {
        key_label: key_column.map(|column| labels.variable_label(column).to_string()),
        key_column: key_column.map(str::to_string),
        key_strategy: key.as_ref().map(|found| found.strategy.clone()),
        key_values,
        default_selection: defaults,
        selection,
        secondary,
    })
}

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use super::*;

    fn households() -> DataFrame {
        DataFrame::new(vec![
            Column::new("depto".into(), [Some("Cabañas"), Some("San Miguel"), None, Some("Cabañas")]),
            Column::new("area".into(), ["Urbano", "Rural", "Urbano", "Rural"]),
            Column::new("miembros".into(), [3i64, 5, 2, 4]),
        ])
        .unwrap()
    }

    #[test]
    fn parses_column_and_values() {
        let criterion: FilterCriterion = "depto= Cabañas , San Miguel,".parse().unwrap();
        assert_eq!(criterion.column, "depto");
        assert_eq!(criterion.values, vec!["Cabañas", "San Miguel"]);
        assert!("sin_igual".parse::<FilterCriterion>().is_err());
        assert!("=x".parse::<FilterCriterion>().is_err());
    }

    #[test]
    fn apply_keeps_matching_rows_only() {
        let df = households();
        let view = FilterSet::new()
            .with("depto", ["Cabañas"])
            .with("area", ["Rural"])
            .apply(&df)
            .unwrap();
        assert_eq!(view.height(), 1);
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn missing_cells_never_match() {
        let view = FilterSet::new()
            .with("depto", ["Cabañas", "San Miguel"])
            .apply(&households())
            .unwrap();
        assert_eq!(view.height(), 3);
    }

    #[test]
    fn empty_and_unknown_criteria_are_ignored() {
        let filters = FilterSet::new()
            .with("depto", Vec::<String>::new())
            .with("no_existe", ["x"]);
        assert!(!filters.is_empty());
        let view = filters.apply(&households()).unwrap();
        assert_eq!(view.height(), 4);
    }

    #[test]
    fn numeric_cells_match_their_text() {
        let view = FilterSet::new()
            .with("miembros", ["3", "4"])
            .apply(&households())
            .unwrap();
        assert_eq!(view.height(), 2);
    }

    #[test]
    fn options_measure_secondary_filters_under_key_selection() {
        let df = households();
        let labels = LabelMaps::default();

        let defaults = filter_options(&df, Some("depto"), &labels, None).unwrap();
        assert_eq!(defaults.key_column.as_deref(), Some("depto"));
        assert_eq!(defaults.key_values, vec!["Cabañas", "San Miguel"]);
        assert_eq!(defaults.selection, defaults.default_selection);
        assert_eq!(
            defaults
                .secondary
                .iter()
                .map(|filter| filter.column.as_str())
                .collect::<Vec<_>>(),
            vec!["area", "miembros"]
        );

        let cabanas = vec!["Cabañas".to_string()];
        let narrowed = filter_options(&df, Some("depto"), &labels, Some(&cabanas)).unwrap();
        assert_eq!(narrowed.selection, cabanas);
        let miembros = narrowed
            .secondary
            .iter()
            .find(|filter| filter.column == "miembros")
            .unwrap();
        assert_eq!(miembros.values, vec!["3", "4"]);

        let single = vec!["San Miguel".to_string()];
        let options = filter_options(&df, Some("depto"), &labels, Some(&single)).unwrap();
        assert!(options.secondary.is_empty());
        assert_eq!(options.key_values.len(), 2);
    }

    #[test]
    fn secondary_candidates_exclude_key_and_sort_by_cardinality() {
        let df = households();
        assert_eq!(
            secondary_filter_candidates(&df, Some("depto")),
            vec!["area", "miembros"]
        );
        assert_eq!(
            secondary_filter_candidates(&df, None),
            vec!["depto", "area", "miembros"]
        );
    }
}
