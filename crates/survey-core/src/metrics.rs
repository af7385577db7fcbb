use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use survey_common::any_to_f64;

use crate::frame::{cells, distinct_count};

/// Headline numbers shown above the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    /// Rows in the view.
    pub records: usize,
    /// Sum of the weight column, when one is configured and present.
    pub weight_sum: Option<f64>,
    /// Distinct values of the key filter column, when it is present.
    pub groups: Option<usize>,
}

impl HeadlineMetrics {
    pub fn compute(view: &DataFrame, weight: Option<&str>, key_column: Option<&str>) -> Self {
        let weight_sum = weight
            .and_then(|name| view.column(name).ok())
            .map(|column| cells(column).filter_map(any_to_f64).sum());
        let groups = key_column
            .filter(|name| view.column(name).is_ok())
            .map(|name| distinct_count(view, name));
        Self {
            records: view.height(),
            weight_sum,
            groups,
        }
    }
}
