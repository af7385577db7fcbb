//! Loaders for the files a survey dashboard is built from.
//!
//! - [`read_data`]: delimited survey microdata, typed per column.
//! - [`read_codebook`]: spreadsheet or delimited codebook, passed on untouched.
//! - [`read_geojson`]: administrative polygons, empty when absent.
//!
//! Text files are decoded as UTF-8 and fall back to Windows-1252 when that
//! fails, so exports from older statistical packages still load.

pub mod codebook;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod text;

pub use codebook::read_codebook;
pub use error::{IngestError, Result};
pub use frame::{MISSING_MARKERS, RawTable};
pub use geometry::{FeatureCollection, read_geojson};
pub use text::{decode_text, detect_delimiter, read_data, read_delimited};
