//! CLI argument definitions for the Silver pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

use silver_model::Category;

#[derive(Parser)]
#[command(
    name = "silver-pipeline",
    version,
    about = "Coffee-machine telemetry pipeline - merge DAT exports and build the Silver layer",
    long_about = "Merge controller DAT exports into Bronze Source Tables and incrementally\n\
                  validate, deduplicate and historize them into Silver tables.\n\n\
                  Categories: Cleaning, Info, Product, Rinse."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Root folder holding BronzeRawData, SilverRawData and the export folders.
    #[arg(long = "base-dir", value_name = "DIR", global = true)]
    pub base_dir: Option<PathBuf>,

    /// TOML file with folder configuration.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate, deduplicate and historize Source Tables into the Silver layer.
    Silver(SilverArgs),

    /// Merge new DAT exports into the Bronze Source Tables.
    Bronze(RunArgs),

    /// Bronze merge followed by the Silver stage for every category.
    Run(RunArgs),

    /// List the categories and their output columns.
    Categories,
}

#[derive(Args, Default)]
pub struct RunArgs {
    /// Run date keying history folders (default: today).
    #[arg(long = "date", value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Also write the run report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Args, Default)]
pub struct SilverArgs {
    /// Category to process; repeat for several (default: all).
    #[arg(long = "category", short = 'c', value_name = "CATEGORY")]
    pub categories: Vec<Category>,

    #[command(flatten)]
    pub run: RunArgs,
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
