//! CLI argument definitions for the survey dashboard.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use survey_config::DEFAULT_SETTINGS_PATH;
use survey_core::FilterCriterion;
use survey_model::Normalize;

#[derive(Parser)]
#[command(
    name = "survey-dash",
    version,
    about = "Survey dashboard - label, filter and tabulate survey microdata",
    long_about = "Label survey microdata with its codebook, filter it and compute\n\
                  frequency tables, cross-tabulations, numeric summaries and\n\
                  indicators described by a tabulation plan."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file naming the data sources and key columns.
    #[arg(
        long = "config",
        value_name = "PATH",
        default_value = DEFAULT_SETTINGS_PATH,
        global = true
    )]
    pub config: PathBuf,

    /// Keep rows whose COLUMN is one of the listed values (repeatable).
    #[arg(long = "filter", value_name = "COLUMN=V1,V2", global = true)]
    pub filters: Vec<FilterCriterion>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow survey values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Headline metrics, every table in the plan, and indicators.
    Dashboard(DashboardArgs),

    /// Frequency table of one variable.
    Freq(FreqArgs),

    /// Cross-tabulation of two variables.
    Crosstab(CrosstabArgs),

    /// Mean, median, minimum and maximum of a numeric variable.
    Summary(SummaryArgs),

    /// Normalized codebook: variable labels and value-label counts.
    Codebook(OutputArgs),

    /// Map view and layers as JSON for a deck renderer.
    Map,

    /// Key filter column, its values, and secondary filter candidates.
    Filters(OutputArgs),
}

#[derive(Args)]
pub struct OutputArgs {
    /// Print JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct DashboardArgs {
    /// Tabulation plan (default: plan_path from settings).
    #[arg(long = "plan", value_name = "PATH")]
    pub plan: Option<PathBuf>,

    /// Indicator rules (default: rules_path from settings).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: Option<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct FreqArgs {
    #[arg(value_name = "VAR")]
    pub var: String,

    /// Weight column (default: weight_col from settings).
    #[arg(long = "weight", value_name = "COLUMN")]
    pub weight: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct CrosstabArgs {
    #[arg(value_name = "ROW")]
    pub row: String,

    #[arg(value_name = "COL")]
    pub col: String,

    /// Weight column (default: weight_col from settings).
    #[arg(long = "weight", value_name = "COLUMN")]
    pub weight: Option<String>,

    /// Percentages within rows, within columns, or raw counts.
    #[arg(long = "normalize", value_enum, default_value = "index")]
    pub normalize: NormalizeArg,

    /// Group numeric operands into 0, 1, 2-5, 6-10 and 10+.
    #[arg(long = "binned")]
    pub binned: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct SummaryArgs {
    #[arg(value_name = "VAR")]
    pub var: String,

    /// Weight column for the weighted mean and median.
    #[arg(long = "weight", value_name = "COLUMN")]
    pub weight: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum NormalizeArg {
    Index,
    Columns,
    None,
}

impl From<NormalizeArg> for Normalize {
    fn from(arg: NormalizeArg) -> Self {
        match arg {
            NormalizeArg::Index => Normalize::Index,
            NormalizeArg::Columns => Normalize::Columns,
            NormalizeArg::None => Normalize::None,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
