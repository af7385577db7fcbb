use polars::prelude::DataFrame;
use survey_common::{any_to_f64, round_to};
use survey_model::NumericSummary;

use crate::frame::cells;

/// Mean, median, minimum and maximum of a numeric variable.
///
/// Values that do not parse as numbers are dropped; `None` when nothing is
/// left. With a weight column present, rows with a missing weight are also
/// dropped and the mean and median are weighted. Mean and median are
/// rounded to three decimals.
pub fn summarize_numeric(
    view: &DataFrame,
    variable: &str,
    weight: Option<&str>,
) -> Option<NumericSummary> {
    let column = view.column(variable).ok()?;
    let values: Vec<Option<f64>> = cells(column).map(any_to_f64).collect();
    let weights = weight.and_then(|w| view.column(w).ok());

    let summary = match weights {
        Some(weights) => {
            let pairs: Vec<(f64, f64)> = values
                .into_iter()
                .zip(cells(weights).map(any_to_f64))
                .filter_map(|(value, weight)| Some((value?, weight?)))
                .collect();
            weighted_summary(variable, pairs)?
        }
        None => {
            let present: Vec<f64> = values.into_iter().flatten().collect();
            unweighted_summary(variable, present)?
        }
    };
    Some(summary)
}

fn unweighted_summary(variable: &str, mut values: Vec<f64>) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    Some(NumericSummary {
        variable: variable.to_string(),
        weighted: false,
        count,
        mean: round_to(mean, 3),
        median: round_to(median, 3),
        min: values[0],
        max: values[count - 1],
    })
}

fn weighted_summary(variable: &str, mut pairs: Vec<(f64, f64)>) -> Option<NumericSummary> {
    if pairs.is_empty() {
        return None;
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let total_weight: f64 = pairs.iter().map(|(_, w)| w).sum();
    let (mean, median) = if total_weight > 0.0 {
        let weighted_sum: f64 = pairs.iter().map(|(v, w)| v * w).sum();
        (weighted_sum / total_weight, weighted_median(&pairs, total_weight))
    } else {
        (f64::NAN, f64::NAN)
    };
    Some(NumericSummary {
        variable: variable.to_string(),
        weighted: true,
        count: pairs.len(),
        mean: round_to(mean, 3),
        median: round_to(median, 3),
        min: pairs[0].0,
        max: pairs[pairs.len() - 1].0,
    })
}

/// First value, in ascending order, at which the cumulative weight reaches
/// half the total weight. `pairs` must be sorted by value.
fn weighted_median(pairs: &[(f64, f64)], total_weight: f64) -> f64 {
    let half = total_weight / 2.0;
    let mut cumulative = 0.0;
    for (value, weight) in pairs {
        cumulative += weight;
        if cumulative >= half {
            return *value;
        }
    }
    pairs.last().map_or(f64::NAN, |(value, _)| *value)
}
