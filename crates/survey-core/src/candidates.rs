//! Ordered column-choosing heuristics.
//!
//! A [`CandidateChain`] runs its strategies in order and takes the first
//! column any of them names. Two chains are built here:
//!
//! - [`key_filter_chain`]: configured column, then a column of moderate
//!   cardinality, then the first column.
//! - [`head_sex_chain`]: known household-head sex column names, then any
//!   column whose name mentions both `jef` and `sexo`.

use polars::prelude::DataFrame;
use tracing::debug;

use crate::frame::{column_names, distinct_count};

/// A single heuristic that may pick a column of a frame.
pub trait ColumnCandidate: Send + Sync {
    fn pick(&self, df: &DataFrame) -> Option<String>;

    /// Human-readable name for this strategy (for logging/debugging).
    fn strategy_name(&self) -> &str;
}

/// The first listed name present in the frame.
#[derive(Debug, Clone)]
pub struct NamedColumn {
    label: &'static str,
    names: Vec<String>,
}

impl NamedColumn {
    pub fn new<I, S>(label: &'static str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label,
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ColumnCandidate for NamedColumn {
    fn pick(&self, df: &DataFrame) -> Option<String> {
        self.names
            .iter()
            .find(|name| df.column(name).is_ok())
            .cloned()
    }

    fn strategy_name(&self) -> &str {
        self.label
    }
}

/// The column with the most distinct values within `min..=max`.
/// Ties go to the earlier column.
#[derive(Debug, Clone, Copy)]
pub struct ModerateCardinality {
    pub min: usize,
    pub max: usize,
}

impl Default for ModerateCardinality {
    fn default() -> Self {
        Self { min: 3, max: 30 }
    }
}

impl ColumnCandidate for ModerateCardinality {
    fn pick(&self, df: &DataFrame) -> Option<String> {
        let mut best: Option<(String, usize)> = None;
        for name in column_names(df) {
            let count = distinct_count(df, &name);
            if count < self.min || count > self.max {
                continue;
            }
            if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
                best = Some((name, count));
            }
        }
        best.map(|(name, _)| name)
    }

    fn strategy_name(&self) -> &str {
        "moderate_cardinality"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FirstColumn;

impl ColumnCandidate for FirstColumn {
    fn pick(&self, df: &DataFrame) -> Option<String> {
        column_names(df).into_iter().next()
    }

    fn strategy_name(&self) -> &str {
        "first_column"
    }
}

/// The first column whose lower-cased name contains every fragment.
#[derive(Debug, Clone)]
pub struct NameContainsAll {
    fragments: Vec<String>,
}

impl NameContainsAll {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }
}

impl ColumnCandidate for NameContainsAll {
    fn pick(&self, df: &DataFrame) -> Option<String> {
        column_names(df).into_iter().find(|name| {
            let lower = name.to_lowercase();
            self.fragments.iter().all(|fragment| lower.contains(fragment.as_str()))
        })
    }

    fn strategy_name(&self) -> &str {
        "name_contains_all"
    }
}

/// The column a chain settled on and the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainMatch {
    pub column: String,
    pub strategy: String,
}

/// An ordered list of column strategies; the first match wins.
#[derive(Default)]
pub struct CandidateChain {
    strategies: Vec<Box<dyn ColumnCandidate>>,
}

impl CandidateChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_strategy(mut self, strategy: Box<dyn ColumnCandidate>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.strategy_name()).collect()
    }

    pub fn resolve(&self, df: &DataFrame) -> Option<ChainMatch> {
        let found = self.strategies.iter().find_map(|strategy| {
            strategy.pick(df).map(|column| ChainMatch {
                column,
                strategy: strategy.strategy_name().to_string(),
            })
        });
        if let Some(found) = &found {
            debug!(column = %found.column, strategy = %found.strategy, "candidate chain matched");
        }
        found
    }
}

/// Column names that carry the sex of the household head.
pub const HEAD_SEX_CANDIDATES: [&str; 7] = [
    "sexo_jefatura",
    "sexo_jefe",
    "jefe_sexo",
    "sexo_jefehogar",
    "sexo_jefatura_hogar",
    "p010_sexo_jefatura",
    "p010_sexo_jefe",
];

pub fn key_filter_chain(configured: Option<&str>) -> CandidateChain {
    let mut chain = CandidateChain::new();
    if let Some(configured) = configured {
        chain = chain.add_strategy(Box::new(NamedColumn::new("configured", [configured])));
    }
    chain
        .add_strategy(Box::new(ModerateCardinality::default()))
        .add_strategy(Box::new(FirstColumn))
}

pub fn head_sex_chain() -> CandidateChain {
    CandidateChain::new()
        .add_strategy(Box::new(NamedColumn::new("known_names", HEAD_SEX_CANDIDATES)))
        .add_strategy(Box::new(NameContainsAll::new(["jef", "sexo"])))
}
