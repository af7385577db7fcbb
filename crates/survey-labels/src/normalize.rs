//! Codebook normalization onto the canonical four-column schema.
//!
//! Column resolution runs an ordered chain of [`ColumnStrategy`] values for
//! each canonical column; the first strategy that names a source column wins.
//! The default chain is:
//!
//! 1. **SynonymMatch** - case-insensitive match against known column names
//! 2. **PositionalFallback** - the physical column at the canonical position

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, PolarsResult, Series};
use survey_model::{
    CANONICAL_COLUMNS, CaseInsensitiveSet, CellValue, Codebook, CodebookEntry,
};
use tracing::debug;

use crate::cell::any_to_cell;

/// One of the four canonical codebook columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalColumn {
    Variable,
    Value,
    LabelValue,
    LabelVariable,
}

impl CanonicalColumn {
    /// Resolution order. `LabelVariable` comes last because its positional
    /// fallback depends on where `LabelValue` was found.
    pub const ALL: [Self; 4] = [
        Self::Variable,
        Self::Value,
        Self::LabelValue,
        Self::LabelVariable,
    ];

    pub fn name(self) -> &'static str {
        CANONICAL_COLUMNS[self.position()]
    }

    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Variable => &["variable", "var"],
            Self::Value => &["value", "valor"],
            Self::LabelValue => &["label_value", "etiqueta_valor", "etiqueta"],
            Self::LabelVariable => &["label_variable", "etiqueta_variable"],
        }
    }

    fn position(self) -> usize {
        match self {
            Self::Variable => 0,
            Self::Value => 1,
            Self::LabelValue => 2,
            Self::LabelVariable => 3,
        }
    }
}

/// Source column chosen for each canonical column. `None` means the
/// canonical column is synthesized as entirely missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnResolution {
    pub variable: Option<String>,
    pub value: Option<String>,
    pub label_value: Option<String>,
    pub label_variable: Option<String>,
}

impl ColumnResolution {
    pub fn get(&self, target: CanonicalColumn) -> Option<&str> {
        match target {
            CanonicalColumn::Variable => self.variable.as_deref(),
            CanonicalColumn::Value => self.value.as_deref(),
            CanonicalColumn::LabelValue => self.label_value.as_deref(),
            CanonicalColumn::LabelVariable => self.label_variable.as_deref(),
        }
    }

    fn set(&mut self, target: CanonicalColumn, source: Option<String>) {
        let slot = match target {
            CanonicalColumn::Variable => &mut self.variable,
            CanonicalColumn::Value => &mut self.value,
            CanonicalColumn::LabelValue => &mut self.label_value,
            CanonicalColumn::LabelVariable => &mut self.label_variable,
        };
        *slot = source;
    }
}

/// A single heuristic for locating a canonical column in a codebook.
pub trait ColumnStrategy: Send + Sync {
    /// Returns the source column to use for `target`, if this strategy finds one.
    ///
    /// `resolved` holds the columns chosen for earlier canonical columns.
    fn resolve(
        &self,
        target: CanonicalColumn,
        source_columns: &[String],
        resolved: &ColumnResolution,
    ) -> Option<String>;

    /// Human-readable name for this strategy (for logging/debugging).
    fn strategy_name(&self) -> &str;
}

/// Matches known column names, ignoring case and surrounding whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct SynonymMatch;

impl ColumnStrategy for SynonymMatch {
    fn resolve(
        &self,
        target: CanonicalColumn,
        source_columns: &[String],
        _resolved: &ColumnResolution,
    ) -> Option<String> {
        let lookup = CaseInsensitiveSet::new(source_columns);
        lookup
            .first_match(target.synonyms().iter().copied())
            .map(str::to_string)
    }

    fn strategy_name(&self) -> &str {
        "synonym_match"
    }
}

/// Takes the physical column at the canonical position. A codebook with only
/// three columns reuses the value label column as the variable label.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionalFallback;

impl ColumnStrategy for PositionalFallback {
    fn resolve(
        &self,
        target: CanonicalColumn,
        source_columns: &[String],
        resolved: &ColumnResolution,
    ) -> Option<String> {
        if target == CanonicalColumn::LabelVariable && source_columns.len() <= 3 {
            return resolved
                .get(CanonicalColumn::LabelValue)
                .map(str::to_string);
        }
        source_columns.get(target.position()).cloned()
    }

    fn strategy_name(&self) -> &str {
        "positional_fallback"
    }
}

/// Ordered chain of column strategies.
pub struct ColumnResolver {
    strategies: Vec<Box<dyn ColumnStrategy>>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self::new()
            .add_strategy(Box::new(SynonymMatch))
            .add_strategy(Box::new(PositionalFallback))
    }
}

impl ColumnResolver {
    /// Create a resolver with no strategies.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn add_strategy(mut self, strategy: Box<dyn ColumnStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.strategy_name()).collect()
    }

    pub fn resolve(&self, source_columns: &[String]) -> ColumnResolution {
        let mut resolution = ColumnResolution::default();
        for target in CanonicalColumn::ALL {
            let found = self.strategies.iter().find_map(|strategy| {
                strategy
                    .resolve(target, source_columns, &resolution)
                    .map(|column| (strategy.strategy_name(), column))
            });
            match &found {
                Some((strategy, column)) => {
                    debug!(target = target.name(), column = %column, strategy, "resolved codebook column");
                }
                None => debug!(target = target.name(), "codebook column missing"),
            }
            resolution.set(target, found.map(|(_, column)| column));
        }
        resolution
    }
}

/// Normalizes an arbitrarily shaped codebook with the default resolver.
///
/// When `dataset_columns` is given, variable names that match a dataset
/// column case-insensitively are rewritten to the dataset's spelling.
pub fn normalize_codebook(raw: &DataFrame, dataset_columns: Option<&[String]>) -> Codebook {
    ColumnResolver::default().normalize(raw, dataset_columns)
}

impl ColumnResolver {
    /// Normalizes a codebook with this resolver's strategies.
    pub fn normalize(&self, raw: &DataFrame, dataset_columns: Option<&[String]>) -> Codebook {
        let source_columns: Vec<String> = raw
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        if source_columns.is_empty() || raw.height() == 0 {
            return Codebook::default();
        }
        let resolution = self.resolve(&source_columns);
        let dataset_names = dataset_columns.map(CaseInsensitiveSet::new);

        let variable = source(raw, resolution.get(CanonicalColumn::Variable));
        let value = source(raw, resolution.get(CanonicalColumn::Value));
        let label_value = source(raw, resolution.get(CanonicalColumn::LabelValue));
        let label_variable = source(raw, resolution.get(CanonicalColumn::LabelVariable));

        (0..raw.height())
            .map(|idx| {
                let variable = cell_at(variable, idx).as_text().map(|name| {
                    dataset_names
                        .as_ref()
                        .and_then(|names| names.get(&name))
                        .map_or(name.clone(), str::to_string)
                });
                CodebookEntry {
                    variable,
                    value: cell_at(value, idx),
                    label_value: cell_at(label_value, idx).as_text(),
                    label_variable: cell_at(label_variable, idx).as_text(),
                }
            })
            .collect()
    }
}

fn source<'a>(raw: &'a DataFrame, name: Option<&str>) -> Option<&'a Column> {
    name.and_then(|name| raw.column(name).ok())
}

fn cell_at(column: Option<&Column>, idx: usize) -> CellValue {
    column
        .and_then(|column| column.get(idx).ok())
        .map_or(CellValue::Missing, |value| any_to_cell(&value))
}

/// Renders a codebook as a frame with exactly the canonical columns.
///
/// The value column is Int64 when every present value is an integer, Float64
/// when every present value is numeric, and String otherwise.
pub fn codebook_frame(codebook: &Codebook) -> PolarsResult<DataFrame> {
    let entries = codebook.entries();
    let text = |values: Vec<Option<String>>, name: &str| {
        Series::new(name.into(), values).into_column()
    };
    let columns = vec![
        text(
            entries.iter().map(|e| e.variable.clone()).collect(),
            CanonicalColumn::Variable.name(),
        ),
        value_column(entries),
        text(
            entries.iter().map(|e| e.label_value.clone()).collect(),
            CanonicalColumn::LabelValue.name(),
        ),
        text(
            entries.iter().map(|e| e.label_variable.clone()).collect(),
            CanonicalColumn::LabelVariable.name(),
        ),
    ];
    DataFrame::new(columns)
}

fn value_column(entries: &[CodebookEntry]) -> Column {
    let name = CanonicalColumn::Value.name();
    let present = || entries.iter().map(|e| &e.value).filter(|v| !v.is_missing());
    if present().all(|v| matches!(v, CellValue::Integer(_))) {
        let values: Vec<Option<i64>> = entries.iter().map(|e| e.value.as_integer()).collect();
        return Series::new(name.into(), values).into_column();
    }
    if present().all(|v| matches!(v, CellValue::Integer(_) | CellValue::Float(_))) {
        let values: Vec<Option<f64>> = entries.iter().map(|e| e.value.as_float()).collect();
        return Series::new(name.into(), values).into_column();
    }
    let values: Vec<Option<String>> = entries.iter().map(|e| e.value.as_text()).collect();
    Series::new(name.into(), values).into_column()
}
