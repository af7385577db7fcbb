//! Codebook loading from spreadsheets or delimited text.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::DataFrame;
use survey_common::format_numeric;
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::frame::RawTable;
use crate::text::read_delimited;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Reads a codebook in whatever shape it has. Spreadsheets are read from
/// their first worksheet; any other file is read as delimited text.
pub fn read_codebook(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let table = if is_spreadsheet(path) {
        read_first_sheet(path)?
    } else {
        read_delimited(path)?
    };
    let df = table.into_frame()?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded codebook"
    );
    Ok(df)
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

fn read_first_sheet(path: &Path) -> Result<RawTable> {
    let spreadsheet_error = |message: String| IngestError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let sheet_names = workbook.sheet_names();
    let Some(sheet_name) = sheet_names.first().cloned() else {
        debug!(path = %path.display(), "workbook has no sheets");
        return Ok(RawTable::default());
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| spreadsheet_error(format!("sheet {sheet_name}: {e}")))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };
    let headers = header_row
        .iter()
        .map(|cell| cell_text(cell).unwrap_or_default())
        .collect();
    let body = rows
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok(RawTable::new(headers, body))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(format_numeric(*f)),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreadsheet_extensions_are_case_insensitive() {
        assert!(is_spreadsheet(Path::new("codebook.XLSX")));
        assert!(is_spreadsheet(Path::new("codebook.ods")));
        assert!(!is_spreadsheet(Path::new("codebook.csv")));
        assert!(!is_spreadsheet(Path::new("codebook")));
    }

    #[test]
    fn numeric_cells_keep_integer_text() {
        assert_eq!(cell_text(&Data::Float(1.0)).as_deref(), Some("1"));
        assert_eq!(cell_text(&Data::Float(1.5)).as_deref(), Some("1.5"));
        assert_eq!(cell_text(&Data::Empty), None);
    }
}
