//! Pipeline execution engine.
//!
//! Applies an ordered list of named steps to a table, recording one
//! [`StepRecord`] per attempted step and stopping at the first failure.

use anyhow::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A table-to-table transformation.
pub type StepFn = Arc<dyn Fn(DataFrame) -> Result<DataFrame> + Send + Sync>;

/// A named transformation registered into a pipeline.
#[derive(Clone)]
pub struct Step {
    name: String,
    function: StepFn,
}

impl Step {
    pub fn new<F>(name: impl Into<String>, function: F) -> Self
    where
        F: Fn(DataFrame) -> Result<DataFrame> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            function: Arc::new(function),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, df: DataFrame) -> Result<DataFrame> {
        (self.function)(df)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Outcome of a single step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StepOutcome {
    /// The step ran; `rows_affected` is the row count of its output.
    Success { rows_affected: usize },
    /// The step returned an error; nothing after it ran.
    Failed { error: String },
}

/// One entry of an execution report, in step order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl StepRecord {
    pub fn success(step: impl Into<String>, rows_affected: usize) -> Self {
        Self {
            step: step.into(),
            outcome: StepOutcome::Success { rows_affected },
        }
    }

    pub fn failed(step: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            outcome: StepOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StepOutcome::Success { .. })
    }
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Success { rows_affected } => {
                write!(f, "{}: success ({rows_affected} rows)", self.step)
            }
            StepOutcome::Failed { error } => write!(f, "{}: failed ({error})", self.step),
        }
    }
}

/// Records produced by one [`Pipeline::execute`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionReport {
    records: Vec<StepRecord>,
}

impl ExecutionReport {
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when every attempted step succeeded.
    pub fn succeeded(&self) -> bool {
        self.records.iter().all(StepRecord::is_success)
    }

    /// The record of the step that stopped execution, if any.
    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.records.iter().find(|r| !r.is_success())
    }

    pub fn into_records(self) -> Vec<StepRecord> {
        self.records
    }
}

/// Assembles a [`Pipeline`]. Steps run in the order they are added.
#[derive(Debug, Default, Clone)]
pub struct PipelineBuilder {
    steps: Vec<Step>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step. Names are not checked for uniqueness; reports are only
    /// unambiguous when callers keep them distinct.
    #[must_use]
    pub fn add_step<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(DataFrame) -> Result<DataFrame> + Send + Sync + 'static,
    {
        self.steps.push(Step::new(name, function));
        self
    }

    #[must_use]
    pub fn push(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline { steps: self.steps }
    }
}

/// An immutable, ordered sequence of steps.
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(Step::name)
    }

    /// Run every step against a copy of `df`.
    ///
    /// Returns the table produced by the last successful step together with
    /// one record per attempted step. The first failing step is recorded and
    /// ends the run; its partial output is discarded. `df` itself is never
    /// modified.
    pub fn execute(&self, df: &DataFrame) -> (DataFrame, ExecutionReport) {
        let mut current = df.clone();
        let mut records = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            match step.apply(current.clone()) {
                Ok(next) => {
                    tracing::debug!(step = step.name(), rows = next.height(), "Step applied");
                    records.push(StepRecord::success(step.name(), next.height()));
                    current = next;
                }
                Err(e) => {
                    tracing::warn!(step = step.name(), error = %e, "Step failed, halting pipeline");
                    records.push(StepRecord::failed(step.name(), format!("{e:#}")));
                    break;
                }
            }
        }

        (current, ExecutionReport { records })
    }
}
