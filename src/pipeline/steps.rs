//! Built-in cleaning steps.
//!
//! Every function here takes a table and returns a new one; none of them look
//! at anything but their input. They are registered into a [`Pipeline`] by
//! name, usually through [`StepKind`](super::spec::StepKind).
//!
//! [`Pipeline`]: super::executor::Pipeline

use crate::types::{ColumnKind, columns_of_kind};
use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;

/// Fill value for text columns that had no value.
pub const UNKNOWN_MARKER: &str = "unknown";

/// Drop rows equal to an earlier row across every column, keeping the first.
pub fn remove_duplicates(df: DataFrame) -> Result<DataFrame> {
    df.lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .context("Failed to drop duplicate rows")
}

/// Promote date columns to millisecond datetimes.
///
/// Datetime columns keep their unit and time zone.
pub fn standardize_dates(df: DataFrame) -> Result<DataFrame> {
    let exprs: Vec<Expr> = df
        .get_columns()
        .iter()
        .map(|c| {
            let name = c.name().as_str();
            match c.dtype() {
                DataType::Date => col(name)
                    .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
                    .alias(name),
                _ => col(name),
            }
        })
        .collect();

    df.lazy()
        .select(exprs)
        .collect()
        .context("Failed to standardize temporal columns")
}

/// Fill nulls by column kind.
///
/// Numeric columns get the column mean, temporal columns get the current
/// time, text, categorical and boolean columns are turned into text and
/// filled with [`UNKNOWN_MARKER`]. Nested columns and other non-text values
/// such as durations are left as they are, as are columns without nulls.
///
/// The temporal fill reads the clock, so two runs over the same input do not
/// produce the same output.
pub fn fill_missing_values(df: DataFrame) -> Result<DataFrame> {
    let now = Utc::now();
    let exprs: Vec<Expr> = df
        .get_columns()
        .iter()
        .map(|c| {
            let name = c.name().as_str();
            if c.null_count() == 0 {
                col(name)
            } else {
                fill_expr(name, c.dtype(), now)
            }
        })
        .collect();

    df.lazy()
        .select(exprs)
        .collect()
        .context("Failed to fill missing values")
}

fn fill_expr(name: &str, dtype: &DataType, now: DateTime<Utc>) -> Expr {
    let expr = col(name);
    let filled = match ColumnKind::from_dtype(dtype) {
        ColumnKind::Numeric => expr
            .clone()
            .cast(DataType::Float64)
            .fill_null(expr.cast(DataType::Float64).mean()),
        ColumnKind::Temporal => expr.fill_null(now_literal(dtype, now)),
        ColumnKind::Nested | ColumnKind::Other => expr,
        ColumnKind::Text | ColumnKind::Categorical | ColumnKind::Boolean => {
            expr.cast(DataType::String).fill_null(lit(UNKNOWN_MARKER))
        }
    };
    filled.alias(name)
}

fn now_literal(dtype: &DataType, now: DateTime<Utc>) -> Expr {
    match dtype {
        DataType::Datetime(unit, _) => {
            let value = match unit {
                TimeUnit::Milliseconds => now.timestamp_millis(),
                TimeUnit::Microseconds => now.timestamp_micros(),
                TimeUnit::Nanoseconds => now.timestamp_nanos_opt().unwrap_or(i64::MAX),
            };
            lit(value).cast(dtype.clone())
        }
        _ => lit(now.timestamp_millis())
            .cast(DataType::Datetime(TimeUnit::Milliseconds, None))
            .cast(dtype.clone()),
    }
}

/// Drop rows outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`, one numeric column at a time.
///
/// Columns are visited in schema order and each column's quartiles are taken
/// from the table as already filtered by the columns before it, so the result
/// depends on column order. Rows with a null in the column being filtered are
/// dropped. Columns with no values are skipped.
pub fn remove_outliers(mut df: DataFrame) -> Result<DataFrame> {
    for name in columns_of_kind(&df, ColumnKind::Numeric) {
        let values = df
            .column(&name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let values = values.f64()?;

        let q1 = values.quantile(0.25, QuantileMethod::Linear)?;
        let q3 = values.quantile(0.75, QuantileMethod::Linear)?;
        let (Some(q1), Some(q3)) = (q1, q3) else {
            continue;
        };

        let iqr = q3 - q1;
        let lower = q1 - 1.5 * iqr;
        let upper = q3 + 1.5 * iqr;
        let mask = values.gt_eq(lower) & values.lt_eq(upper);

        let before = df.height();
        df = df
            .filter(&mask)
            .with_context(|| format!("Failed to filter outliers in '{name}'"))?;
        tracing::debug!(column = %name, lower, upper, dropped = before - df.height(), "Outlier bounds applied");
    }
    Ok(df)
}

/// Lowercase every text and categorical cell.
///
/// Categorical columns stay categorical. Enum columns become text, since the
/// lowercased values may fall outside their categories.
pub fn convert_to_lowercase(df: DataFrame) -> Result<DataFrame> {
    let exprs: Vec<Expr> = df
        .get_columns()
        .iter()
        .map(|c| {
            let name = c.name().as_str();
            match c.dtype() {
                DataType::String => col(name).str().to_lowercase().alias(name),
                DataType::Categorical(_, ordering) => col(name)
                    .cast(DataType::String)
                    .str()
                    .to_lowercase()
                    .cast(DataType::Categorical(None, *ordering))
                    .alias(name),
                DataType::Enum(_, _) => col(name)
                    .cast(DataType::String)
                    .str()
                    .to_lowercase()
                    .alias(name),
                _ => col(name),
            }
        })
        .collect();

    df.lazy()
        .select(exprs)
        .collect()
        .context("Failed to lowercase text columns")
}

/// Normalise free text in `columns` (every text column when `None`).
///
/// Values are trimmed, lowercased, runs of whitespace collapse to one space
/// and anything outside `[\w\s]` is stripped. Named columns that are not in
/// the table are ignored; named columns that are not text are cast first.
pub fn clean_text_columns(df: DataFrame, columns: Option<&[String]>) -> Result<DataFrame> {
    let targets: Vec<String> = match columns {
        Some(cols) => cols.to_vec(),
        None => columns_of_kind(&df, ColumnKind::Text),
    };

    let exprs: Vec<Expr> = df
        .get_columns()
        .iter()
        .map(|c| {
            let name = c.name().as_str();
            if targets.iter().any(|t| t == name) {
                clean_text_expr(name)
            } else {
                col(name)
            }
        })
        .collect();

    df.lazy()
        .select(exprs)
        .collect()
        .context("Failed to clean text columns")
}

/// [`clean_text_columns`] over a fixed column list, as a pipeline step.
pub fn clean_text_columns_in(
    columns: Vec<String>,
) -> impl Fn(DataFrame) -> Result<DataFrame> + Send + Sync + 'static {
    move |df| clean_text_columns(df, Some(columns.as_slice()))
}

fn clean_text_expr(name: &str) -> Expr {
    col(name)
        .cast(DataType::String)
        .str()
        .strip_chars(lit(NULL))
        .str()
        .to_lowercase()
        .str()
        .replace_all(lit(r"\s+"), lit(" "), false)
        .str()
        .replace_all(lit(r"[^\w\s]"), lit(""), false)
        .alias(name)
}

#[cfg(test)]
mod tests;
