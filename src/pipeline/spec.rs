//! Named built-in steps, so pipelines can be assembled from configuration.

use super::executor::{Pipeline, PipelineBuilder};
use super::steps;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in cleaning steps, in the order the default pipeline runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    RemoveDuplicates,
    StandardizeDates,
    FillMissingValues,
    RemoveOutliers,
    ConvertToLowercase,
    CleanTextColumns,
}

impl StepKind {
    pub const ALL: [Self; 6] = [
        Self::RemoveDuplicates,
        Self::StandardizeDates,
        Self::FillMissingValues,
        Self::RemoveOutliers,
        Self::ConvertToLowercase,
        Self::CleanTextColumns,
    ];

    /// Name used in step records.
    pub fn name(self) -> &'static str {
        match self {
            Self::RemoveDuplicates => "remove_duplicates",
            Self::StandardizeDates => "standardize_dates",
            Self::FillMissingValues => "fill_missing_values",
            Self::RemoveOutliers => "remove_outliers",
            Self::ConvertToLowercase => "convert_to_lowercase",
            Self::CleanTextColumns => "clean_text_columns",
        }
    }

    /// Register this step on `builder`.
    ///
    /// `text_columns` only affects [`StepKind::CleanTextColumns`]; `None`
    /// cleans every text column.
    pub fn register(self, builder: PipelineBuilder, text_columns: Option<&[String]>) -> PipelineBuilder {
        match self {
            Self::RemoveDuplicates => builder.add_step(self.name(), steps::remove_duplicates),
            Self::StandardizeDates => builder.add_step(self.name(), steps::standardize_dates),
            Self::FillMissingValues => builder.add_step(self.name(), steps::fill_missing_values),
            Self::RemoveOutliers => builder.add_step(self.name(), steps::remove_outliers),
            Self::ConvertToLowercase => builder.add_step(self.name(), steps::convert_to_lowercase),
            Self::CleanTextColumns => match text_columns {
                Some(columns) => {
                    builder.add_step(self.name(), steps::clean_text_columns_in(columns.to_vec()))
                }
                None => builder.add_step(self.name(), |df| steps::clean_text_columns(df, None)),
            },
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.name()).collect();
                format!("Unknown step '{s}', expected one of: {}", known.join(", "))
            })
    }
}

impl Pipeline {
    /// Build a pipeline from built-in steps, in the given order.
    pub fn from_kinds(kinds: &[StepKind], text_columns: Option<&[String]>) -> Self {
        kinds
            .iter()
            .fold(Self::builder(), |builder, kind| kind.register(builder, text_columns))
            .build()
    }
}

/// All six built-in steps in their standard order.
pub fn default_cleaning_pipeline() -> Pipeline {
    Pipeline::from_kinds(&StepKind::ALL, None)
}
