pub mod binning;
pub mod cell;
pub mod codebook;
pub mod error;
pub mod kinds;
pub mod labels;
pub mod lookup;
pub mod plan;
pub mod rules;
pub mod tables;

pub use binning::BinSpec;
pub use cell::CellValue;
pub use codebook::{CANONICAL_COLUMNS, Codebook, CodebookEntry};
pub use error::{ModelError, Result};
pub use kinds::ColumnKind;
pub use labels::{LabelMaps, ValueLabelMap};
pub use lookup::CaseInsensitiveSet;
pub use plan::{CrosstabSpec, SummarySpec, TableGroup, TableSpec, TabulationPlan};
pub use rules::{IndicatorCriterion, IndicatorRule, IndicatorRules};
pub use tables::{CrossTab, FrequencyRow, FrequencyTable, Normalize, NumericSummary};
