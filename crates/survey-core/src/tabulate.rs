//! Frequency tables and cross-tabulations.
//!
//! Rows whose variable is missing are dropped. Weights, when the weight
//! column exists, are summed per group with missing weights counted as zero;
//! otherwise each row counts once.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use survey_common::{any_to_f64, round_to};
use survey_model::{BinSpec, ColumnKind, CrossTab, FrequencyRow, FrequencyTable, Normalize};
use tracing::debug;

use crate::column_kind::infer_column_kind;
use crate::frame::{cells, text_keys, weight_values};
use crate::ordering::sort_labels;

/// Frequency of each distinct value of `variable`, largest first.
///
/// Ties keep the order in which values first appear.
pub fn freq(view: &DataFrame, variable: &str, weight: Option<&str>) -> FrequencyTable {
    let weights = weight_values(view, weight);
    let weighted = weights.is_some();
    let Ok(column) = view.column(variable) else {
        debug!(variable, "frequency requested for absent column");
        return FrequencyTable::empty(variable, weighted);
    };

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for (idx, key) in text_keys(column).into_iter().enumerate() {
        let Some(key) = key else {
            continue;
        };
        let amount = weights.as_ref().map_or(1.0, |w| w[idx]);
        match sums.get_mut(&key) {
            Some(sum) => *sum += amount,
            None => {
                sums.insert(key.clone(), amount);
                order.push(key);
            }
        }
    }

    let total: f64 = order.iter().map(|key| sums[key]).sum();
    let mut rows: Vec<FrequencyRow> = order
        .into_iter()
        .map(|value| {
            let n = sums[&value];
            let percent = if total != 0.0 { 100.0 * n / total } else { 0.0 };
            FrequencyRow { value, n, percent }
        })
        .collect();
    rows.sort_by(|a, b| b.n.total_cmp(&a.n));

    FrequencyTable {
        variable: variable.to_string(),
        weighted,
        rows,
    }
}

/// Two-way table of `row` by `col`.
pub fn crosstab(
    view: &DataFrame,
    row: &str,
    col: &str,
    weight: Option<&str>,
    normalize: Normalize,
) -> CrossTab {
    tabulate_pair(view, row, col, weight, normalize, None)
}

/// Like [`crosstab`], but numeric operands are first grouped into the
/// default bins (`0`, `1`, `2-5`, `6-10`, `10+`).
pub fn crosstab_binned(
    view: &DataFrame,
    row: &str,
    col: &str,
    weight: Option<&str>,
    normalize: Normalize,
) -> CrossTab {
    crosstab_binned_with(view, row, col, weight, normalize, &BinSpec::default())
}

/// Binned cross-tabulation with caller-supplied bins. Values outside every
/// bin are treated as missing.
pub fn crosstab_binned_with(
    view: &DataFrame,
    row: &str,
    col: &str,
    weight: Option<&str>,
    normalize: Normalize,
    bins: &BinSpec,
) -> CrossTab {
    tabulate_pair(view, row, col, weight, normalize, Some(bins))
}

enum LabelOrder<'a> {
    Natural,
    Bins(&'a BinSpec),
}

impl LabelOrder<'_> {
    fn sort(&self, labels: &mut [String]) {
        match self {
            Self::Natural => sort_labels(labels),
            Self::Bins(bins) => labels.sort_by_key(|label| bins.label_rank(label)),
        }
    }
}

struct Axis<'a> {
    keys: Vec<Option<String>>,
    order: LabelOrder<'a>,
}

fn axis<'a>(view: &DataFrame, name: &str, bins: Option<&'a BinSpec>) -> Option<Axis<'a>> {
    let column = view.column(name).ok()?;
    let numeric = infer_column_kind(view, name) == Some(ColumnKind::Numeric);
    match bins {
        Some(bins) if numeric => Some(Axis {
            keys: cells(column)
                .map(|value| {
                    any_to_f64(value)
                        .and_then(|v| bins.label_for(v))
                        .map(str::to_string)
                })
                .collect(),
            order: LabelOrder::Bins(bins),
        }),
        _ => Some(Axis {
            keys: text_keys(column),
            order: LabelOrder::Natural,
        }),
    }
}

fn tabulate_pair(
    view: &DataFrame,
    row: &str,
    col: &str,
    weight: Option<&str>,
    normalize: Normalize,
    bins: Option<&BinSpec>,
) -> CrossTab {
    let weights = weight_values(view, weight);
    let mut table = CrossTab::empty(row, col, normalize, weights.is_some());
    let (Some(rows), Some(cols)) = (axis(view, row, bins), axis(view, col, bins)) else {
        debug!(row, col, "crosstab requested for absent column");
        return table;
    };

    let mut sums: HashMap<(String, String), f64> = HashMap::new();
    let mut row_labels: Vec<String> = Vec::new();
    let mut col_labels: Vec<String> = Vec::new();
    for (idx, (r, c)) in rows.keys.into_iter().zip(cols.keys).enumerate() {
        let (Some(r), Some(c)) = (r, c) else {
            continue;
        };
        if !row_labels.contains(&r) {
            row_labels.push(r.clone());
        }
        if !col_labels.contains(&c) {
            col_labels.push(c.clone());
        }
        let amount = weights.as_ref().map_or(1.0, |w| w[idx]);
        *sums.entry((r, c)).or_insert(0.0) += amount;
    }
    rows.order.sort(&mut row_labels);
    cols.order.sort(&mut col_labels);

    let mut cells: Vec<Vec<f64>> = row_labels
        .iter()
        .map(|r| {
            col_labels
                .iter()
                .map(|c| sums.get(&(r.clone(), c.clone())).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();
    normalize_cells(&mut cells, normalize);

    table.row_labels = row_labels;
    table.col_labels = col_labels;
    table.cells = cells;
    table
}

/// Converts sums to percentages of their row or column total. A zero total
/// is replaced by one, so an all-zero row or column stays at zero.
fn normalize_cells(cells: &mut [Vec<f64>], normalize: Normalize) {
    match normalize {
        Normalize::None => {}
        Normalize::Index => {
            for row in cells.iter_mut() {
                let total = nonzero(row.iter().sum());
                for cell in row.iter_mut() {
                    *cell = round_to(100.0 * *cell / total, 2);
                }
            }
        }
        Normalize::Columns => {
            let width = cells.first().map_or(0, Vec::len);
            for j in 0..width {
                let total = nonzero(cells.iter().map(|row| row[j]).sum());
                for row in cells.iter_mut() {
                    row[j] = round_to(100.0 * row[j] / total, 2);
                }
            }
        }
    }
}

fn nonzero(total: f64) -> f64 {
    if total == 0.0 { 1.0 } else { total }
}
