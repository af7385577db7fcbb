use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use serde::Serialize;
use survey_config::{Settings, load_plan, load_rules};
use survey_core::{
    FilterCriterion, FilterSet, LoadedSurvey, TableResult, build_dashboard, build_map, crosstab,
    crosstab_binned, filter_options, freq, key_filter_chain, load_survey, summarize_numeric,
};
use survey_model::{TabulationPlan, ValueLabelMap};
use tracing::{debug, info, warn};

use crate::cli::{CrosstabArgs, DashboardArgs, FreqArgs, OutputArgs, SummaryArgs};
use survey_cli::logging::redact_value;
use survey_cli::render::{codebook_table, filters_table, print_dashboard, print_table_result};

/// Settings, the loaded survey and the active filters for one invocation.
pub struct Session {
    pub settings: Settings,
    pub survey: LoadedSurvey,
    pub filters: FilterSet,
}

impl Session {
    pub fn open(config: &Path, criteria: &[FilterCriterion]) -> Result<Self> {
        let settings = Settings::load(config)
            .with_context(|| format!("load settings {}", config.display()))?;
        let survey = load_survey(&settings)?;
        let mut filters = FilterSet::new();
        for criterion in criteria {
            if survey.labeled.column(&criterion.column).is_err() {
                warn!(column = %criterion.column, "filter column not in data, ignored");
            }
            debug!(
                column = %criterion.column,
                values = %redact_value(&criterion.values.join(",")),
                "filter"
            );
            filters.push(criterion.clone());
        }
        Ok(Self {
            settings,
            survey,
            filters,
        })
    }

    fn view(&self) -> Result<DataFrame> {
        let view = self
            .filters
            .apply(&self.survey.labeled)
            .context("apply filters")?;
        info!(rows = view.height(), total = self.survey.labeled.height(), "view");
        Ok(view)
    }

    fn weight<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit.or(self.settings.weight_col.as_deref())
    }

    fn require(&self, view: &DataFrame, column: &str) -> Result<()> {
        if view.column(column).is_err() {
            bail!("column '{column}' not found in {}", self.settings.data_path.display());
        }
        Ok(())
    }

    fn title<'a>(&'a self, variable: &'a str) -> &'a str {
        self.survey.labels.variable_label(variable)
    }
}

pub fn run_dashboard(session: &Session, args: &DashboardArgs) -> Result<()> {
    let plan_path = args.plan.as_deref().or(session.settings.plan_path.as_deref());
    let plan = match plan_path {
        Some(path) => load_plan(path).with_context(|| format!("load plan {}", path.display()))?,
        None => TabulationPlan::default(),
    };
    let rules = match args.rules.as_deref().or(session.settings.rules_path.as_deref()) {
        Some(path) => load_rules(path).with_context(|| format!("load rules {}", path.display()))?,
        None => Default::default(),
    };
    let report = build_dashboard(
        &session.survey,
        &session.settings,
        &session.filters,
        &plan,
        &rules,
    )?;
    if args.output.json {
        print_json(&report)
    } else {
        print_dashboard(&report);
        Ok(())
    }
}

pub fn run_freq(session: &Session, args: &FreqArgs) -> Result<()> {
    let view = session.view()?;
    session.require(&view, &args.var)?;
    let table = freq(&view, &args.var, session.weight(args.weight.as_deref()));
    emit(
        &args.output,
        &format!("Frequency: {}", session.title(&args.var)),
        &TableResult::Frequency(table),
    )
}

pub fn run_crosstab(session: &Session, args: &CrosstabArgs) -> Result<()> {
    let view = session.view()?;
    session.require(&view, &args.row)?;
    session.require(&view, &args.col)?;
    let weight = session.weight(args.weight.as_deref());
    let normalize = args.normalize.into();
    let table = if args.binned {
        crosstab_binned(&view, &args.row, &args.col, weight, normalize)
    } else {
        crosstab(&view, &args.row, &args.col, weight, normalize)
    };
    emit(
        &args.output,
        &format!(
            "Crosstab: {} × {}",
            session.title(&args.row),
            session.title(&args.col)
        ),
        &TableResult::Crosstab(table),
    )
}

pub fn run_summary(session: &Session, args: &SummaryArgs) -> Result<()> {
    let view = session.view()?;
    session.require(&view, &args.var)?;
    let Some(summary) = summarize_numeric(&view, &args.var, args.weight.as_deref()) else {
        bail!("column '{}' has no numeric values in the current view", args.var);
    };
    emit(
        &args.output,
        &format!("Summary: {}", session.title(&args.var)),
        &TableResult::Summary(summary),
    )
}

#[derive(Serialize)]
struct CodebookReport<'a> {
    entries: usize,
    variable_labels: &'a BTreeMap<String, String>,
    value_labels: &'a BTreeMap<String, ValueLabelMap>,
}

pub fn run_codebook(session: &Session, args: &OutputArgs) -> Result<()> {
    let labels = &session.survey.labels;
    if args.json {
        return print_json(&CodebookReport {
            entries: session.survey.codebook.len(),
            variable_labels: &labels.variable_labels,
            value_labels: &labels.value_labels,
        });
    }
    println!(
        "Codebook: {} entries, {} labeled variables",
        session.survey.codebook.len(),
        labels.value_labels.len()
    );
    println!("{}", codebook_table(labels));
    Ok(())
}

pub fn run_map(session: &Session) -> Result<()> {
    let view = session.view()?;
    let key = key_filter_chain(session.settings.key_filter_col.as_deref())
        .resolve(&session.survey.labeled);
    let report = build_map(
        &view,
        &session.survey.polygons,
        session.settings.lat_col.as_deref(),
        session.settings.lon_col.as_deref(),
        key.as_ref().map(|found| found.column.as_str()),
    );
    if report.is_empty() {
        warn!("no map layers: check polygons_path and lat_col/lon_col in settings");
    }
    print_json(&report)
}

pub fn run_filters(session: &Session, args: &OutputArgs) -> Result<()> {
    let configured = session.settings.key_filter_col.as_deref();
    let key_selection = key_filter_chain(configured)
        .resolve(&session.survey.labeled)
        .and_then(|found| session.filters.selection(&found.column).map(<[String]>::to_vec));
    let options = filter_options(
        &session.survey.labeled,
        configured,
        &session.survey.labels,
        key_selection.as_deref(),
    )
    .context("compute filter options")?;
    if args.json {
        return print_json(&options);
    }
    match (&options.key_column, &options.key_strategy) {
        (Some(column), Some(strategy)) => {
            println!("Key filter: {column} (via {strategy})");
            println!("Default selection: {}", options.default_selection.join(", "));
            if options.selection != options.default_selection {
                println!("Selected: {}", options.selection.join(", "));
            }
        }
        _ => println!("No key filter column; the whole survey is shown."),
    }
    println!("{}", filters_table(&options));
    Ok(())
}

fn emit(output: &OutputArgs, title: &str, result: &TableResult) -> Result<()> {
    if output.json {
        print_json(result)
    } else {
        print_table_result(title, result);
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}
