//! Column typing for loaded tables.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use survey_common::{parse_f64, parse_i64};
use tracing::debug;

use crate::error::Result;

/// Cell texts treated as missing in addition to blanks.
pub const MISSING_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "#N/A", "NaN", "nan", "NULL", "null", "None", "<NA>",
];

/// Untyped table as read from a file: header names plus text cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Builds a table, giving blank headers a positional name and making
    /// repeated headers unique with a numeric suffix.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self {
            headers: unique_headers(headers),
            rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Converts to a frame. Short rows are padded with missing cells and
    /// cells beyond the header width are dropped.
    pub fn into_frame(self) -> Result<DataFrame> {
        let width = self.headers.len();
        let height = self.rows.len();
        let mut columns: Vec<Vec<Option<String>>> =
            (0..width).map(|_| Vec::with_capacity(height)).collect();
        let mut overflow = 0usize;
        for row in self.rows {
            if row.len() > width {
                overflow += 1;
            }
            let mut cells = row.into_iter();
            for column in &mut columns {
                column.push(cells.next().flatten().and_then(clean_cell));
            }
        }
        if overflow > 0 {
            debug!(rows = overflow, width, "dropped cells beyond header width");
        }
        let columns: Vec<Column> = self
            .headers
            .iter()
            .zip(columns)
            .map(|(name, values)| infer_column(name, values))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

fn clean_cell(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(value)
    }
}

/// Int64 when every present cell is an integer, Float64 when every present
/// cell is a number, String otherwise.
fn infer_column(name: &str, values: Vec<Option<String>>) -> Column {
    let present = || values.iter().flatten();
    let any_present = present().next().is_some();
    if any_present && present().all(|v| parse_i64(v).is_some()) {
        let ints: Vec<Option<i64>> = values.iter().map(|v| v.as_deref().and_then(parse_i64)).collect();
        return Series::new(name.into(), ints).into_column();
    }
    if any_present && present().all(|v| parse_f64(v).is_some()) {
        let floats: Vec<Option<f64>> = values.iter().map(|v| v.as_deref().and_then(parse_f64)).collect();
        return Series::new(name.into(), floats).into_column();
    }
    Series::new(name.into(), values).into_column()
}

fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(headers.len());
    for (idx, header) in headers.into_iter().enumerate() {
        let trimmed = header.trim().trim_start_matches('\u{feff}').trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            trimmed.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 2;
        while out.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}
