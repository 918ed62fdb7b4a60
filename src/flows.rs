//! End-to-end runs: load, clean, validate and measure.
//!
//! Every input (settings, source, pipeline) is passed in explicitly; nothing
//! runs at module load.

use crate::config::AppConfig;
use crate::error::Result;
use crate::loader::{DataLoader, Source};
use crate::metrics::{DataMetrics, TableMetrics};
use crate::pipeline::{ExecutionReport, Pipeline};
use crate::types::Datasets;
use crate::validator::DataValidator;
use serde::Serialize;
use std::collections::BTreeMap;

/// Output of [`run_quality_flow`].
#[derive(Debug, Serialize)]
pub struct QualityReport {
    #[serde(skip)]
    pub cleaned: Datasets,
    /// Step records per dataset.
    pub executions: BTreeMap<String, ExecutionReport>,
    pub metrics: BTreeMap<String, TableMetrics>,
}

impl QualityReport {
    /// Datasets where some step failed.
    pub fn failed_datasets(&self) -> impl Iterator<Item = &str> {
        self.executions
            .iter()
            .filter(|(_, report)| !report.succeeded())
            .map(|(name, _)| name.as_str())
    }
}

pub fn load_datasets(config: &AppConfig, source: &Source) -> Result<Datasets> {
    DataLoader::new(&config.raw_data_dir).load_data(source)
}

/// Run `pipeline` over each dataset independently.
///
/// A failing step only stops the pipeline for its own dataset; that dataset
/// keeps the table produced by its last successful step.
pub fn clean_datasets(
    datasets: &Datasets,
    pipeline: &Pipeline,
) -> (Datasets, BTreeMap<String, ExecutionReport>) {
    let mut cleaned = Datasets::new();
    let mut executions = BTreeMap::new();

    for (name, df) in datasets {
        let (out, report) = pipeline.execute(df);
        match report.failed_step() {
            Some(record) => tracing::warn!(dataset = %name, "Cleaning stopped early: {record}"),
            None => tracing::info!(
                dataset = %name,
                rows_before = df.height(),
                rows_after = out.height(),
                "Cleaned dataset"
            ),
        }
        cleaned.insert(name.clone(), out);
        executions.insert(name.clone(), report);
    }

    (cleaned, executions)
}

/// Load, clean, validate, then compute metrics on the cleaned tables.
///
/// # Errors
///
/// Fails when loading fails or when validation of the cleaned tables finds a
/// column whose type contradicts its kind; metrics are not computed then.
pub fn run_quality_flow(
    config: &AppConfig,
    source: &Source,
    pipeline: &Pipeline,
) -> Result<QualityReport> {
    let datasets = load_datasets(config, source)?;
    let (cleaned, executions) = clean_datasets(&datasets, pipeline);

    DataValidator::new(&cleaned)
        .with_expected_kinds(config.expected_kinds.clone())
        .validate()?;

    let metrics = DataMetrics::new(&cleaned).calculate_metrics()?;

    Ok(QualityReport {
        cleaned,
        executions,
        metrics,
    })
}

/// Load and validate without cleaning. Returns the loaded datasets.
pub fn validate_flow(config: &AppConfig, source: &Source) -> Result<Datasets> {
    let datasets = load_datasets(config, source)?;
    DataValidator::new(&datasets)
        .with_expected_kinds(config.expected_kinds.clone())
        .validate()?;
    Ok(datasets)
}

/// Load and compute metrics without cleaning.
pub fn metrics_flow(
    config: &AppConfig,
    source: &Source,
) -> Result<BTreeMap<String, TableMetrics>> {
    let datasets = load_datasets(config, source)?;
    DataMetrics::new(&datasets).calculate_metrics()
}
