//! Percentage indicators driven by declarative rules.

use std::collections::BTreeMap;

use polars::prelude::{Column, DataFrame};
use regex::RegexSet;
use survey_common::{any_to_f64, any_to_string, round_to};
use survey_model::{IndicatorCriterion, IndicatorRule, IndicatorRules};
use tracing::{debug, warn};

use crate::frame::cells;

/// Evaluate every rule against the view.
///
/// Each value is the share of rows, in percent rounded to two decimals,
/// that satisfy the rule. A rule yields `None` when its variable is absent,
/// the view is empty, it has no criterion, or its patterns do not compile.
pub fn compute_indicators(view: &DataFrame, rules: &IndicatorRules) -> BTreeMap<String, Option<f64>> {
    rules
        .rules
        .iter()
        .map(|(name, rule)| (name.clone(), evaluate(view, name, rule)))
        .collect()
}

fn evaluate(view: &DataFrame, name: &str, rule: &IndicatorRule) -> Option<f64> {
    let var = rule.var.as_deref()?;
    let Ok(column) = view.column(var) else {
        debug!(indicator = name, var, "indicator variable absent from view");
        return None;
    };
    if view.height() == 0 {
        return None;
    }
    let hits = match rule.criterion()? {
        IndicatorCriterion::LabelRegexAny(patterns) => {
            let set = match RegexSet::new(patterns) {
                Ok(set) => set,
                Err(error) => {
                    warn!(indicator = name, %error, "invalid indicator pattern");
                    return None;
                }
            };
            count_matches(column, &set)
        }
        IndicatorCriterion::Threshold(threshold) => count_at_least(column, threshold),
    };
    Some(round_to(100.0 * hits as f64 / column.len() as f64, 2))
}

/// Rows whose lower-cased text matches any pattern. Missing cells are
/// matched as empty text.
fn count_matches(column: &Column, set: &RegexSet) -> usize {
    cells(column)
        .map(|value| any_to_string(value).to_lowercase())
        .filter(|text| set.is_match(text))
        .count()
}

/// Rows whose numeric value is at least `threshold`, with missing and
/// non-numeric cells read as zero.
fn count_at_least(column: &Column, threshold: f64) -> usize {
    cells(column)
        .map(|value| any_to_f64(value).unwrap_or(0.0))
        .filter(|value| *value >= threshold)
        .count()
}
