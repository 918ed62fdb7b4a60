//! # tabclean
//!
//! Load tabular files, run them through a cleaning pipeline, check their
//! column types and compute descriptive metrics.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabclean::config::AppConfig;
//! use tabclean::flows::run_quality_flow;
//! use tabclean::loader::Source;
//!
//! let config = AppConfig::default();
//! let report = run_quality_flow(&config, &Source::All, &config.pipeline())?;
//!
//! for (name, execution) in &report.executions {
//!     println!("{name}: {} steps, ok = {}", execution.len(), execution.succeeded());
//! }
//! # Ok::<(), tabclean::error::TabcleanError>(())
//! ```
//!
//! ## Modules
//!
//! - [`loader`]: reads CSV, spreadsheet, JSON and Parquet files into named tables
//! - [`pipeline`]: the step executor and the built-in cleaning steps
//! - [`validator`]: fail-fast column type checks and missing-value reports
//! - [`metrics`]: summary statistics, correlations and null counts
//! - [`flows`]: load → clean → validate → metrics
//! - [`config`], [`logging`], [`error`]: settings file, tracing setup, error type

pub mod config;
pub mod error;
pub mod flows;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod types;
pub mod validator;
