use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::Table;
use serde::Serialize;
use tracing::info_span;

use silver_core::{FullRunReport, PipelineConfig, SilverReport, run_all, run_bronze, run_silver};
use silver_ingest::BronzeReport;
use silver_model::{Category, Schema};

use crate::cli::{Cli, RunArgs, SilverArgs};
use crate::summary::apply_table_style;

/// Build the pipeline configuration from `--config` and `--base-dir`.
pub fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(base_dir) = &cli.base_dir {
        config = config.with_base_dir(base_dir);
    }
    Ok(config)
}

pub fn run_date(args: &RunArgs) -> NaiveDate {
    args.date.unwrap_or_else(|| Local::now().date_naive())
}

pub fn run_silver_command(config: &PipelineConfig, args: &SilverArgs) -> Result<SilverReport> {
    let date = run_date(&args.run);
    let categories: Vec<Category> = if args.categories.is_empty() {
        Category::ALL.to_vec()
    } else {
        let mut selected = args.categories.clone();
        selected.sort();
        selected.dedup();
        selected
    };
    let span = info_span!("silver", run_date = %date);
    let report = span.in_scope(|| run_silver(&config.layout(), &categories, date));
    write_report_json(args.run.report_json.as_deref(), &report)?;
    Ok(report)
}

pub fn run_bronze_command(config: &PipelineConfig, args: &RunArgs) -> Result<BronzeReport> {
    let date = run_date(args);
    let span = info_span!("bronze", run_date = %date);
    let report = span
        .in_scope(|| run_bronze(config, date))
        .context("bronze merge")?;
    write_report_json(args.report_json.as_deref(), &report)?;
    Ok(report)
}

pub fn run_full_command(config: &PipelineConfig, args: &RunArgs) -> Result<FullRunReport> {
    let date = run_date(args);
    let span = info_span!("run", run_date = %date);
    let report = span
        .in_scope(|| run_all(config, date))
        .context("pipeline run")?;
    write_report_json(args.report_json.as_deref(), &report)?;
    Ok(report)
}

pub fn run_categories() {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Source", "Output", "Columns"]);
    apply_table_style(&mut table);
    for category in Category::ALL {
        let schema = Schema::for_category(category);
        table.add_row(vec![
            category.to_string(),
            category.source_file_name(),
            category.output_file_name(),
            schema.output_columns().join(", "),
        ]);
    }
    println!("{table}");
}

fn write_report_json<T: Serialize>(path: Option<&Path>, report: &T) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("serialize report")?;
    std::fs::write(path, json).with_context(|| format!("write report {}", path.display()))?;
    Ok(())
}
