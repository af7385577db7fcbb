//! Result types for tabulation and numeric summaries.

use serde::{Deserialize, Serialize};

/// One value of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub value: String,
    pub n: f64,
    pub percent: f64,
}

/// Counts (or weighted sums) per distinct value, ordered by descending `n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub variable: String,
    pub weighted: bool,
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    pub fn empty(variable: impl Into<String>, weighted: bool) -> Self {
        Self {
            variable: variable.into(),
            weighted,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.n).sum()
    }

    pub fn get(&self, value: &str) -> Option<&FrequencyRow> {
        self.rows.iter().find(|row| row.value == value)
    }
}

/// Direction in which a cross-tabulation is turned into percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalize {
    /// Each row sums to 100.
    #[default]
    Index,
    /// Each column sums to 100.
    Columns,
    /// Raw counts or weighted sums.
    None,
}

impl Normalize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Columns => "columns",
            Self::None => "none",
        }
    }
}

/// Two-way table. `cells[i][j]` belongs to `row_labels[i]` and `col_labels[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    pub row_variable: String,
    pub col_variable: String,
    pub normalize: Normalize,
    pub weighted: bool,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub cells: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn empty(
        row_variable: impl Into<String>,
        col_variable: impl Into<String>,
        normalize: Normalize,
        weighted: bool,
    ) -> Self {
        Self {
            row_variable: row_variable.into(),
            col_variable: col_variable.into(),
            normalize,
            weighted,
            row_labels: Vec::new(),
            col_labels: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty() || self.col_labels.is_empty()
    }

    pub fn cell(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.row_labels.iter().position(|label| label == row)?;
        let j = self.col_labels.iter().position(|label| label == col)?;
        self.cells.get(i).and_then(|cells| cells.get(j)).copied()
    }

    pub fn row_total(&self, row: usize) -> f64 {
        self.cells.get(row).map_or(0.0, |cells| cells.iter().sum())
    }

    pub fn col_total(&self, col: usize) -> f64 {
        self.cells
            .iter()
            .filter_map(|cells| cells.get(col))
            .sum()
    }
}

/// Central tendency and range of a numeric variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub variable: String,
    pub weighted: bool,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl NumericSummary {
    /// Named statistics in display order; weighted results carry a `_w` suffix.
    pub fn statistics(&self) -> [(&'static str, f64); 4] {
        if self.weighted {
            [
                ("mean_w", self.mean),
                ("median_w", self.median),
                ("min", self.min),
                ("max", self.max),
            ]
        } else {
            [
                ("mean", self.mean),
                ("median", self.median),
                ("min", self.min),
                ("max", self.max),
            ]
        }
    }
}
