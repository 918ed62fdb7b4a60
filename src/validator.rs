//! Structural checks over loaded or cleaned datasets.
//!
//! Validation is fail-fast: the first column whose dtype contradicts its
//! kind aborts the whole pass with [`TabcleanError::Validation`]. Missing
//! values are reported but never fail validation.

use crate::error::{Result, TabcleanError};
use crate::types::{ColumnKind, Datasets, is_numeric_dtype, is_temporal_dtype};
use polars::prelude::*;
use std::collections::HashMap;

pub struct DataValidator<'a> {
    datasets: &'a Datasets,
    expected: HashMap<String, ColumnKind>,
}

impl<'a> DataValidator<'a> {
    pub fn new(datasets: &'a Datasets) -> Self {
        Self {
            datasets,
            expected: HashMap::new(),
        }
    }

    /// Declare the kind each named column must have, in any table that has it.
    #[must_use]
    pub fn with_expected_kinds(mut self, expected: HashMap<String, ColumnKind>) -> Self {
        self.expected = expected;
        self
    }

    /// Check every table in name order, stopping at the first violation.
    pub fn validate(&self) -> Result<()> {
        for (name, df) in self.datasets {
            tracing::info!("Validating DataFrame: {name}");
            self.check_columns(name, df, ColumnKind::Numeric)?;
            self.check_columns(name, df, ColumnKind::Temporal)?;
            tracing::info!("{}", missing_values_report(df));
            tracing::info!("DataFrame {name} is valid.");
        }
        Ok(())
    }

    /// Columns of `df` that are either classified as `kind` or declared as it.
    fn columns_to_check<'df>(&self, df: &'df DataFrame, kind: ColumnKind) -> Vec<&'df Column> {
        df.get_columns()
            .iter()
            .filter(|c| {
                ColumnKind::from_dtype(c.dtype()) == kind
                    || self.expected.get(c.name().as_str()) == Some(&kind)
            })
            .collect()
    }

    fn check_columns(&self, table: &str, df: &DataFrame, kind: ColumnKind) -> Result<()> {
        for column in self.columns_to_check(df, kind) {
            let dtype = column.dtype();
            let (ok, expected) = match kind {
                ColumnKind::Numeric => (is_numeric_dtype(dtype), "numerical"),
                ColumnKind::Temporal => (is_temporal_dtype(dtype), "date"),
                _ => (true, ""),
            };
            if !ok {
                tracing::warn!(table, column = %column.name(), %dtype, "Column kind mismatch");
                return Err(TabcleanError::Validation(format!(
                    "Column {} in {table} is not of {expected} type.",
                    column.name()
                )));
            }
        }
        Ok(())
    }
}

/// Names the columns of `df` that contain nulls.
pub fn missing_values_report(df: &DataFrame) -> String {
    let missing: Vec<&str> = df
        .get_columns()
        .iter()
        .filter(|c| c.null_count() > 0)
        .map(|c| c.name().as_str())
        .collect();

    if missing.is_empty() {
        "No missing data".to_owned()
    } else {
        format!("Missing values found in columns: [{}]", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasets(entries: Vec<(&str, DataFrame)>) -> Datasets {
        entries
            .into_iter()
            .map(|(name, df)| (name.to_owned(), df))
            .collect()
    }

    #[test]
    fn test_well_typed_tables_pass() -> anyhow::Result<()> {
        let days = Series::new("day".into(), &[19_723i32, 19_724])
            .cast(&DataType::Date)?
            .into_column();
        let amount = Column::new("amount".into(), &[1.5, 2.5]);
        let sales = DataFrame::new(vec![days, amount])?;
        let people = df!("name" => &[Some("ann"), None])?;

        let data = datasets(vec![("sales_csv", sales), ("people_json", people)]);

        assert!(DataValidator::new(&data).validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_declared_numeric_text_column_fails() -> anyhow::Result<()> {
        let df = df!("price" => &["1.0", "n/a"], "qty" => &[1, 2])?;
        let data = datasets(vec![("orders_csv", df)]);
        let expected = HashMap::from([("price".to_owned(), ColumnKind::Numeric)]);

        let err = DataValidator::new(&data)
            .with_expected_kinds(expected)
            .validate()
            .err()
            .ok_or_else(|| anyhow::anyhow!("validation unexpectedly passed"))?;

        assert!(matches!(err, TabcleanError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation failed: Column price in orders_csv is not of numerical type."
        );
        Ok(())
    }

    #[test]
    fn test_declared_temporal_column_fails() -> anyhow::Result<()> {
        let df = df!("signup" => &["2024-01-01"])?;
        let data = datasets(vec![("users_csv", df)]);
        let expected = HashMap::from([("signup".to_owned(), ColumnKind::Temporal)]);

        let err = DataValidator::new(&data)
            .with_expected_kinds(expected)
            .validate()
            .err()
            .ok_or_else(|| anyhow::anyhow!("validation unexpectedly passed"))?;

        assert!(err.to_string().contains("signup in users_csv is not of date type"));
        Ok(())
    }

    #[test]
    fn test_first_violation_stops_the_pass() -> anyhow::Result<()> {
        let a = df!("x" => &["bad"])?;
        let b = df!("x" => &["also bad"])?;
        let data = datasets(vec![("b_csv", b), ("a_csv", a)]);
        let expected = HashMap::from([("x".to_owned(), ColumnKind::Numeric)]);

        let err = DataValidator::new(&data)
            .with_expected_kinds(expected)
            .validate()
            .err()
            .ok_or_else(|| anyhow::anyhow!("validation unexpectedly passed"))?;

        // tables are visited in name order
        assert!(err.to_string().contains("in a_csv"));
        Ok(())
    }

    #[test]
    fn test_missing_values_report() -> anyhow::Result<()> {
        let df = df!(
            "a" => &[Some(1), None],
            "b" => &[1, 2],
            "c" => &[None, Some("x")]
        )?;
        assert_eq!(
            missing_values_report(&df),
            "Missing values found in columns: [a, c]"
        );

        let complete = df!("a" => &[1, 2])?;
        assert_eq!(missing_values_report(&complete), "No missing data");
        Ok(())
    }

    #[test]
    fn test_declared_numeric_integer_columns_pass() -> anyhow::Result<()> {
        let df = df!(
            "qty" => &[1u8, 2, 3],
            "delta" => &[-1i16, 0, 1],
            "price" => &[1.5f32, 2.0, 2.5]
        )?;
        let data = datasets(vec![("stock_csv", df)]);
        let expected = HashMap::from([
            ("qty".to_owned(), ColumnKind::Numeric),
            ("delta".to_owned(), ColumnKind::Numeric),
            ("price".to_owned(), ColumnKind::Numeric),
        ]);

        assert!(
            DataValidator::new(&data)
                .with_expected_kinds(expected)
                .validate()
                .is_ok()
        );
        Ok(())
    }

    #[test]
    fn test_missing_values_do_not_fail_validation() -> anyhow::Result<()> {
        let df = df!("v" => &[None::<f64>, None])?;
        let data = datasets(vec![("empty_csv", df)]);
        assert!(DataValidator::new(&data).validate().is_ok());
        Ok(())
    }
}
