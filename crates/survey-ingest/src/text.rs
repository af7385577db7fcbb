//! Delimited text loading with encoding fallback.

use std::path::Path;

use encoding_rs::WINDOWS_1252;
use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::error::{IngestError, Result};
use crate::frame::RawTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads the survey dataset. A missing file is a hard failure.
pub fn read_data(path: &Path) -> Result<DataFrame> {
    let table = read_delimited(path)?;
    let df = table.into_frame()?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded survey data"
    );
    Ok(df)
}

/// Reads a delimited file into an untyped table.
pub fn read_delimited(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::from_io(path, e))?;
    let text = decode_text(&bytes, path);
    let delimiter = detect_delimiter(path, &text);
    parse_delimited(&text, delimiter, path)
}

/// Decodes file bytes as UTF-8, falling back to Windows-1252.
pub fn decode_text(bytes: &[u8], path: &Path) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(err) => {
            warn!(
                path = %path.display(),
                offset = err.valid_up_to(),
                "file is not valid UTF-8, decoding as Windows-1252"
            );
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
    }
}

/// Tab for `.tsv`/`.tab` files; otherwise semicolon when the header line
/// carries more semicolons than commas; otherwise comma.
pub fn detect_delimiter(path: &Path, text: &str) -> u8 {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if matches!(extension.as_deref(), Some("tsv" | "tab")) {
        return b'\t';
    }
    let header = text.lines().next().unwrap_or("");
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

fn parse_delimited(text: &str, delimiter: u8, path: &Path) -> Result<RawTable> {
    let csv_error = |err: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(|cell| Some(cell.to_string())).collect());
    }
    Ok(RawTable::new(headers, rows))
}
