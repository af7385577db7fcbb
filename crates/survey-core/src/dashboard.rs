//! One full recomputation pass: filter, metrics, plan tables, indicators.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use serde::Serialize;
use survey_config::Settings;
use survey_model::{
    CrossTab, FrequencyTable, IndicatorRules, LabelMaps, NumericSummary, TableSpec,
    TabulationPlan,
};
use tracing::{debug, info, info_span};

use crate::candidates::key_filter_chain;
use crate::filter::FilterSet;
use crate::indicators::compute_indicators;
use crate::metrics::HeadlineMetrics;
use crate::session::LoadedSurvey;
use crate::summary::summarize_numeric;
use crate::tabulate::{crosstab, crosstab_binned, freq};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableResult {
    Frequency(FrequencyTable),
    Crosstab(CrossTab),
    Summary(NumericSummary),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardTable {
    pub title: String,
    pub result: TableResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSection {
    pub name: String,
    pub tables: Vec<DashboardTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub key_column: Option<String>,
    pub key_label: Option<String>,
    pub metrics: HeadlineMetrics,
    pub sections: Vec<DashboardSection>,
    pub indicators: BTreeMap<String, Option<f64>>,
}

/// Filter the labeled survey and compute every table the plan asks for.
///
/// Tables that reference a variable missing from the view are skipped.
/// Frequency tables and crosstabs without their own weight use the
/// configured weight column; summaries only use their own.
pub fn build_dashboard(
    survey: &LoadedSurvey,
    settings: &Settings,
    filters: &FilterSet,
    plan: &TabulationPlan,
    rules: &IndicatorRules,
) -> Result<DashboardReport> {
    let view = filters
        .apply(&survey.labeled)
        .context("apply filters")?;
    let span = info_span!("dashboard", rows = view.height());
    let _guard = span.enter();

    let key = key_filter_chain(settings.key_filter_col.as_deref()).resolve(&survey.labeled);
    let key_column = key.map(|found| found.column);
    let weight = settings.weight_col.as_deref();
    let metrics = HeadlineMetrics::compute(&view, weight, key_column.as_deref());

    let sections: Vec<DashboardSection> = plan
        .groups
        .iter()
        .map(|group| DashboardSection {
            name: group.name.clone(),
            tables: group
                .tables
                .iter()
                .filter_map(|spec| render_table(&view, &survey.labels, spec, weight))
                .collect(),
        })
        .collect();
    let indicators = compute_indicators(&view, rules);

    info!(
        rows = view.height(),
        sections = sections.len(),
        tables = sections.iter().map(|s| s.tables.len()).sum::<usize>(),
        indicators = indicators.len(),
        "dashboard computed"
    );
    Ok(DashboardReport {
        key_label: key_column
            .as_deref()
            .map(|column| survey.labels.variable_label(column).to_string()),
        key_column,
        metrics,
        sections,
        indicators,
    })
}

fn render_table(
    view: &DataFrame,
    labels: &LabelMaps,
    spec: &TableSpec,
    default_weight: Option<&str>,
) -> Option<DashboardTable> {
    if let Some(absent) = spec
        .variables()
        .into_iter()
        .find(|name| view.column(name).is_err())
    {
        debug!(variable = absent, "plan table skipped, variable not in view");
        return None;
    }
    let label = |name: &str| labels.variable_label(name).to_string();
    let table = match spec {
        TableSpec::Freq(var) => DashboardTable {
            title: format!("Frequency: {}", label(var)),
            result: TableResult::Frequency(freq(view, var, default_weight)),
        },
        TableSpec::Crosstab(ct) => {
            let weight = ct.weight.as_deref().or(default_weight);
            let result = if ct.binned {
                crosstab_binned(view, &ct.row, &ct.col, weight, ct.normalize)
            } else {
                crosstab(view, &ct.row, &ct.col, weight, ct.normalize)
            };
            DashboardTable {
                title: format!("Crosstab: {} × {}", label(&ct.row), label(&ct.col)),
                result: TableResult::Crosstab(result),
            }
        }
        TableSpec::Summary(summary) => DashboardTable {
            title: format!("Summary: {}", label(&summary.var)),
            result: TableResult::Summary(summarize_numeric(
                view,
                &summary.var,
                summary.weight.as_deref(),
            )?),
        },
    };
    Some(table)
}
