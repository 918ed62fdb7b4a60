//! Column classification and the dataset collection type.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named tables keyed by dataset name (`sales_csv`, `orders_parquet`, ...).
///
/// A `BTreeMap` keeps iteration in name order so every pass over the
/// collection visits tables in the same sequence.
pub type Datasets = BTreeMap<String, DataFrame>;

/// Broad kind of a column, derived from its polars dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Text,
    Categorical,
    Temporal,
    Boolean,
    Nested,
    /// Durations, times of day, binary and other non-text values.
    Other,
}

impl ColumnKind {
    pub fn from_dtype(dtype: &DataType) -> Self {
        if dtype.is_bool() {
            Self::Boolean
        } else if is_numeric_dtype(dtype) {
            Self::Numeric
        } else if is_temporal_dtype(dtype) {
            Self::Temporal
        } else if matches!(dtype, DataType::Categorical(..) | DataType::Enum(..)) {
            Self::Categorical
        } else if dtype.is_nested() {
            Self::Nested
        } else if matches!(dtype, DataType::String | DataType::Null) {
            Self::Text
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Text => "Text",
            Self::Categorical => "Categorical",
            Self::Temporal => "Temporal",
            Self::Boolean => "Boolean",
            Self::Nested => "Nested",
            Self::Other => "Other",
        }
    }
}

/// Integer and floating point columns.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    dtype.is_primitive_numeric()
}

/// Date and datetime columns; durations and times of day are not timestamps.
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(..))
}

/// Names of the columns of `df` whose kind is `kind`, in schema order.
pub fn columns_of_kind(df: &DataFrame, kind: ColumnKind) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| ColumnKind::from_dtype(c.dtype()) == kind)
        .map(|c| c.name().to_string())
        .collect()
}
