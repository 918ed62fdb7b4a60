//! Cleaning pipelines.
//!
//! A [`Pipeline`] is an ordered list of named table-to-table steps. Executing
//! it applies the steps to a copy of the input, records one [`StepRecord`] per
//! attempted step and stops at the first failure.
//!
//! # Example
//!
//! ```no_run
//! use polars::prelude::*;
//! use tabclean::pipeline::{Pipeline, steps};
//!
//! let pipeline = Pipeline::builder()
//!     .add_step("remove_duplicates", steps::remove_duplicates)
//!     .add_step("convert_to_lowercase", steps::convert_to_lowercase)
//!     .build();
//!
//! let df = df!("name" => &["Ann", "Ann", "BOB"])?;
//! let (cleaned, report) = pipeline.execute(&df);
//! for record in report.records() {
//!     println!("{record}");
//! }
//! # Ok::<(), PolarsError>(())
//! ```
//!
//! # Built-in steps
//!
//! [`StepKind`] names the six steps in [`steps`] so pipelines can be built
//! from configuration or the command line. [`default_cleaning_pipeline`] runs
//! all of them in their standard order.

pub mod executor;
pub mod spec;
pub mod steps;

pub use executor::{ExecutionReport, Pipeline, PipelineBuilder, Step, StepOutcome, StepRecord};
pub use spec::{StepKind, default_cleaning_pipeline};
