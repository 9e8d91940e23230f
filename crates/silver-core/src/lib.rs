//! Orchestration of the Silver pipeline.
//!
//! - **config**: directory configuration and its TOML form
//! - **controller**: the per-category run state machine
//! - **report**: per-category and whole-run outcomes

pub mod config;
pub mod controller;
pub mod error;
pub mod report;

use chrono::NaiveDate;
use tracing::{error, info};

use silver_ingest::{BronzeReport, merge_exports};
use silver_model::{Category, Layout};

pub use config::{BASE_DIR_ENV, PipelineConfig};
pub use controller::{RunController, run_category};
pub use error::{PipelineError, Result};
pub use report::{CategoryReport, FullRunReport, RunState, RunStatus, SilverReport};

/// Run the Silver stage for `categories`.
///
/// A fatal error in one category is logged and reported; the remaining
/// categories still run.
pub fn run_silver(layout: &Layout, categories: &[Category], run_date: NaiveDate) -> SilverReport {
    let mut controller = RunController::new(layout, run_date);
    let mut reports = Vec::with_capacity(categories.len());
    for &category in categories {
        match controller.run(category) {
            Ok(report) => reports.push(report),
            Err(err) => {
                error!(%category, error = %err, "category run failed");
                reports.push(CategoryReport::failed(category, err.to_string()));
            }
        }
    }
    let report = SilverReport {
        run_date,
        categories: reports,
    };
    info!(
        categories = report.categories.len(),
        rows = report.rows_written(),
        failed = report.has_failures(),
        "silver run finished"
    );
    report
}

/// Merge new controller exports into the Bronze Source Tables.
pub fn run_bronze(config: &PipelineConfig, run_date: NaiveDate) -> Result<BronzeReport> {
    let report = merge_exports(&config.layout(), &config.bronze_options(run_date))?;
    info!(
        merged = report.merged.len(),
        rows = report.merged_rows(),
        failed = report.failed.len(),
        "bronze merge finished"
    );
    Ok(report)
}

/// Bronze merge followed by the Silver run over every category.
pub fn run_all(config: &PipelineConfig, run_date: NaiveDate) -> Result<FullRunReport> {
    let bronze = run_bronze(config, run_date)?;
    let silver = run_silver(&config.layout(), &Category::ALL, run_date);
    Ok(FullRunReport { bronze, silver })
}
