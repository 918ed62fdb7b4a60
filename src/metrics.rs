//! Descriptive metrics per table: column summaries, a numeric correlation
//! matrix and missing-value counts.

use crate::error::Result;
use crate::types::{ColumnKind, Datasets, columns_of_kind};
use chrono::DateTime;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub distinct: usize,
    /// Most frequent value and how often it occurs.
    pub top_value: Option<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemporalStats {
    pub min: Option<String>,
    pub max: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanStats {
    pub true_count: usize,
    pub false_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnStats {
    Numeric(NumericStats),
    Text(TextStats),
    Temporal(TemporalStats),
    Boolean(BooleanStats),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: ColumnKind,
    /// Non-null values.
    pub count: usize,
    pub missing: usize,
    /// `None` for nested and other non-text columns.
    pub stats: Option<ColumnStats>,
}

/// Pearson correlations between numeric columns. `data[i][j]` pairs
/// `columns[i]` with `columns[j]`; `None` where the correlation is undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.data.get(i)?.get(j).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMetrics {
    pub summary_statistics: Vec<ColumnSummary>,
    pub correlation_matrix: CorrelationMatrix,
    pub missing_values_count: Vec<(String, usize)>,
}

pub struct DataMetrics<'a> {
    datasets: &'a Datasets,
}

impl<'a> DataMetrics<'a> {
    pub fn new(datasets: &'a Datasets) -> Self {
        Self { datasets }
    }

    pub fn calculate_metrics(&self) -> Result<BTreeMap<String, TableMetrics>> {
        self.datasets
            .iter()
            .map(|(name, df)| {
                tracing::debug!(table = %name, rows = df.height(), "Calculating metrics");
                Ok((name.clone(), table_metrics(df)?))
            })
            .collect()
    }
}

pub fn table_metrics(df: &DataFrame) -> Result<TableMetrics> {
    Ok(TableMetrics {
        summary_statistics: summary_statistics(df)?,
        correlation_matrix: correlation_matrix(df)?,
        missing_values_count: missing_values_count(df),
    })
}

pub fn summary_statistics(df: &DataFrame) -> Result<Vec<ColumnSummary>> {
    df.get_columns().iter().map(summarise_column).collect()
}

fn summarise_column(column: &Column) -> Result<ColumnSummary> {
    let kind = ColumnKind::from_dtype(column.dtype());
    let series = column.as_materialized_series();
    let stats = match kind {
        ColumnKind::Numeric => Some(ColumnStats::Numeric(numeric_stats(series)?)),
        ColumnKind::Temporal => Some(ColumnStats::Temporal(temporal_stats(series)?)),
        ColumnKind::Boolean => Some(ColumnStats::Boolean(boolean_stats(series)?)),
        ColumnKind::Text | ColumnKind::Categorical => Some(ColumnStats::Text(text_stats(series)?)),
        ColumnKind::Nested | ColumnKind::Other => None,
    };

    Ok(ColumnSummary {
        name: column.name().to_string(),
        kind,
        count: column.len() - column.null_count(),
        missing: column.null_count(),
        stats,
    })
}

fn numeric_stats(series: &Series) -> Result<NumericStats> {
    let values = series.cast(&DataType::Float64)?;
    let ca = values.f64()?;

    Ok(NumericStats {
        mean: ca.mean(),
        std: ca.std(1),
        min: ca.min(),
        q1: ca.quantile(0.25, QuantileMethod::Linear)?,
        median: ca.median(),
        q3: ca.quantile(0.75, QuantileMethod::Linear)?,
        max: ca.max(),
    })
}

fn temporal_stats(series: &Series) -> Result<TemporalStats> {
    let values = series.cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
    let ca = values.datetime()?;
    let render = |millis: i64| {
        DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc().to_string())
    };

    Ok(TemporalStats {
        min: ca.min().and_then(render),
        max: ca.max().and_then(render),
    })
}

fn boolean_stats(series: &Series) -> Result<BooleanStats> {
    let ca = series.bool()?;
    let true_count = ca.sum().unwrap_or(0) as usize;
    let false_count = (ca.len() - ca.null_count()) - true_count;
    Ok(BooleanStats {
        true_count,
        false_count,
    })
}

fn text_stats(series: &Series) -> Result<TextStats> {
    let values = series.cast(&DataType::String)?.drop_nulls();
    let distinct = values.n_unique()?;

    let count_name = format!("{}_count", values.name());
    let counts = values.value_counts(true, false, count_name.as_str().into(), false)?;
    let top_value = if counts.height() > 0 {
        let names = counts.column(values.name())?.as_materialized_series();
        let freq = counts
            .column(&count_name)?
            .as_materialized_series()
            .cast(&DataType::UInt64)?;
        match (names.str()?.get(0), freq.u64()?.get(0)) {
            (Some(value), Some(n)) => Some((value.to_owned(), n as usize)),
            _ => None,
        }
    } else {
        None
    };

    Ok(TextStats {
        distinct,
        top_value,
    })
}

/// Pearson correlation between every pair of numeric columns.
///
/// Each pair uses only the rows where both columns have a value. The
/// diagonal is undefined for constant columns and columns with fewer than
/// two values. Tables without numeric columns give an empty matrix.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let columns = columns_of_kind(df, ColumnKind::Numeric);
    let values = columns
        .iter()
        .map(|name| Ok(df.column(name)?.as_materialized_series().cast(&DataType::Float64)?))
        .collect::<Result<Vec<Series>>>()?;

    let mut data = vec![vec![None; columns.len()]; columns.len()];
    for (i, a) in values.iter().enumerate() {
        data[i][i] = self_correlation(a.f64()?);
        for (j, b) in values.iter().enumerate().skip(i + 1) {
            let corr = pairwise_pearson(a.f64()?, b.f64()?)?;
            data[i][j] = corr;
            data[j][i] = corr;
        }
    }

    Ok(CorrelationMatrix { columns, data })
}

/// 1.0 for a column with at least two values and non-zero variance.
fn self_correlation(values: &Float64Chunked) -> Option<f64> {
    let present = values.len() - values.null_count();
    let std = values.std(1)?;
    (present >= 2 && std.is_finite() && std > 0.0).then_some(1.0)
}

fn pairwise_pearson(a: &Float64Chunked, b: &Float64Chunked) -> Result<Option<f64>> {
    let mask = a.is_not_null() & b.is_not_null();
    let a = a.filter(&mask)?;
    let b = b.filter(&mask)?;
    if a.len() < 2 {
        return Ok(None);
    }
    Ok(polars::prelude::cov::pearson_corr(&a, &b).filter(|r| r.is_finite()))
}

/// Null count per column, in column order.
pub fn missing_values_count(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}
