//! Survey tabulation engine and dashboard assembly.
//!
//! The engine functions ([`freq`], [`crosstab`], [`crosstab_binned`],
//! [`summarize_numeric`], [`compute_indicators`]) are best-effort: missing
//! columns and degenerate data produce empty or `None` results instead of
//! errors. Loading ([`load_survey`], [`LoadCache`]) and dashboard assembly
//! ([`build_dashboard`]) are where failures surface.

pub mod candidates;
pub mod column_kind;
pub mod dashboard;
pub mod features;
pub mod filter;
pub mod frame;
pub mod indicators;
pub mod map_layers;
pub mod metrics;
pub mod ordering;
pub mod session;
pub mod summary;
pub mod tabulate;

pub use candidates::{
    CandidateChain, ChainMatch, ColumnCandidate, FirstColumn, ModerateCardinality, NameContainsAll,
    NamedColumn, head_sex_chain, key_filter_chain,
};
pub use column_kind::{column_kinds, infer_column_kind};
pub use dashboard::{DashboardReport, DashboardSection, DashboardTable, TableResult, build_dashboard};
pub use features::{HEAD_SEX_COLUMN, apply_derived_fields};
pub use filter::{
    FilterCriterion, FilterOptions, FilterParseError, FilterSet, SecondaryFilter, filter_options,
    secondary_filter_candidates,
};
pub use frame::{column_names, default_selection, distinct_count, distinct_values};
pub use indicators::compute_indicators;
pub use map_layers::{
    GeoJsonLayer, MapLayer, MapReport, MapView, ScatterLayer, ScatterPoint, build_map,
    polygons_layer, scatter_points,
};
pub use metrics::HeadlineMetrics;
pub use session::{LoadCache, LoadedSurvey, load_survey};
pub use summary::summarize_numeric;
pub use tabulate::{crosstab, crosstab_binned, crosstab_binned_with, freq};
