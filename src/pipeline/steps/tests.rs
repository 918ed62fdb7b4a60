#![expect(clippy::unwrap_used)]
use super::*;
use crate::pipeline::executor::{Pipeline, StepRecord};
use anyhow::Result;

fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(ToOwned::to_owned))
        .collect())
}

#[test]
fn test_remove_duplicates_keeps_first_occurrence() -> Result<()> {
    let df = df!(
        "id" => &[1, 2, 2, 3, 4],
        "name" => &["a", "b", "b", "c", "d"]
    )?;

    let deduped = remove_duplicates(df)?;

    assert_eq!(deduped.height(), 4);
    let ids: Vec<Option<i32>> = deduped.column("id")?.as_materialized_series().i32()?.into_iter().collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4)]);
    Ok(())
}

#[test]
fn test_remove_duplicates_compares_whole_rows() -> Result<()> {
    let df = df!(
        "id" => &[1, 1, 1],
        "name" => &[Some("a"), Some("b"), None]
    )?;

    assert_eq!(remove_duplicates(df)?.height(), 3);
    Ok(())
}

#[test]
fn test_remove_duplicates_is_idempotent() -> Result<()> {
    let df = df!(
        "x" => &[Some(1.0), Some(1.0), None, None, Some(2.0)],
        "y" => &["p", "p", "q", "q", "r"]
    )?;

    let once = remove_duplicates(df)?;
    let twice = remove_duplicates(once.clone())?;

    assert_eq!(once.height(), 3);
    assert!(once.equals_missing(&twice));
    Ok(())
}

#[test]
fn test_duplicate_scenario_reports_row_count() -> Result<()> {
    let df = df!(
        "city" => &["leeds", "york", "york", "hull", "bath"],
        "pop" => &[10, 20, 20, 30, 40]
    )?;
    let pipeline = Pipeline::builder()
        .add_step("remove_duplicates", remove_duplicates)
        .build();

    let (out, report) = pipeline.execute(&df);

    assert_eq!(out.height(), 4);
    assert_eq!(report.records(), &[StepRecord::success("remove_duplicates", 4)]);
    Ok(())
}

#[test]
fn test_standardize_dates_casts_temporal_columns_only() -> Result<()> {
    let days = Series::new("day".into(), &[19_723i32, 19_724])
        .cast(&DataType::Date)?
        .into_column();
    let label = Column::new("label".into(), &["a", "b"]);
    let df = DataFrame::new(vec![days, label])?;

    let out = standardize_dates(df)?;

    assert_eq!(
        out.column("day")?.dtype(),
        &DataType::Datetime(TimeUnit::Milliseconds, None)
    );
    assert_eq!(out.column("day")?.null_count(), 0);
    assert_eq!(out.column("label")?.dtype(), &DataType::String);
    Ok(())
}

#[test]
fn test_standardize_dates_keeps_datetime_precision() -> Result<()> {
    let stamp = 1_700_000_000_123_456_789i64;
    let at = Series::new("at".into(), &[stamp])
        .cast(&DataType::Datetime(TimeUnit::Nanoseconds, None))?
        .into_column();
    let df = DataFrame::new(vec![at])?;

    let out = standardize_dates(df)?;

    assert_eq!(
        out.column("at")?.dtype(),
        &DataType::Datetime(TimeUnit::Nanoseconds, None),
        "datetime unit is kept"
    );
    let values: Vec<Option<i64>> = out
        .column("at")?
        .as_materialized_series()
        .cast(&DataType::Int64)?
        .i64()?
        .into_iter()
        .collect();
    assert_eq!(values, vec![Some(stamp)], "sub-millisecond digits survive");
    Ok(())
}

#[test]
fn test_fill_missing_values_by_kind() -> Result<()> {
    let when = Series::new("when".into(), &[Some(1_700_000_000_000i64), None])
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .into_column();
    let score = Column::new("score".into(), &[Some(10.0), None]);
    let name = Column::new("name".into(), &[None, Some("bob")]);
    let df = DataFrame::new(vec![when, score, name])?;

    let filled = fill_missing_values(df)?;

    for column in filled.get_columns() {
        assert_eq!(column.null_count(), 0, "{} still has nulls", column.name());
    }
    let scores: Vec<Option<f64>> = filled.column("score")?.as_materialized_series().f64()?.into_iter().collect();
    assert_eq!(scores, vec![Some(10.0), Some(10.0)]);
    assert_eq!(
        str_values(&filled, "name")?,
        vec![Some(UNKNOWN_MARKER.to_owned()), Some("bob".to_owned())]
    );
    Ok(())
}

#[test]
fn test_fill_missing_values_uses_mean() -> Result<()> {
    let df = df!("v" => &[Some(1i64), None, Some(3), None, Some(8)])?;

    let filled = fill_missing_values(df)?;

    let values: Vec<Option<f64>> = filled.column("v")?.as_materialized_series().f64()?.into_iter().collect();
    assert_eq!(
        values,
        vec![Some(1.0), Some(4.0), Some(3.0), Some(4.0), Some(8.0)]
    );
    Ok(())
}

#[test]
fn test_fill_missing_values_leaves_complete_columns_alone() -> Result<()> {
    let df = df!(
        "count" => &[1i64, 2, 3],
        "flag" => &[true, false, true]
    )?;

    let filled = fill_missing_values(df.clone())?;

    assert_eq!(filled.column("count")?.dtype(), &DataType::Int64);
    assert_eq!(filled.column("flag")?.dtype(), &DataType::Boolean);
    assert!(filled.equals(&df));
    Ok(())
}

#[test]
fn test_duration_columns_are_not_treated_as_text() -> Result<()> {
    let wait = Series::new("wait".into(), &[Some(1_500i64), None])
        .cast(&DataType::Duration(TimeUnit::Milliseconds))?
        .into_column();
    let df = DataFrame::new(vec![wait])?;

    let filled = fill_missing_values(df.clone())?;
    assert_eq!(
        filled.column("wait")?.dtype(),
        &DataType::Duration(TimeUnit::Milliseconds),
        "fill keeps durations"
    );
    assert_eq!(filled.column("wait")?.null_count(), 1, "durations are not filled");

    let cleaned = clean_text_columns(df, None)?;
    assert_eq!(
        cleaned.column("wait")?.dtype(),
        &DataType::Duration(TimeUnit::Milliseconds),
        "text cleaning skips durations"
    );
    Ok(())
}

#[test]
fn test_remove_outliers_drops_extreme_value() -> Result<()> {
    let df = df!(
        "v" => &[1i64, 2, 3, 4, 100],
        "tag" => &["a", "b", "c", "d", "e"]
    )?;

    let out = remove_outliers(df)?;

    assert_eq!(out.height(), 4);
    assert_eq!(
        str_values(&out, "tag")?,
        vec![
            Some("a".to_owned()),
            Some("b".to_owned()),
            Some("c".to_owned()),
            Some("d".to_owned())
        ]
    );
    Ok(())
}

#[test]
fn test_remove_outliers_filters_sequentially() -> Result<()> {
    let a = [0i64, 0, 0, 0, 0, 0, 0, 0, 100, 100];
    let b = [10i64, 10, 10, 10, 10, 10, 20, 20, 20, 20];

    // `b` is judged on the rows `a` kept, where the two 20s are now outliers.
    let a_first = df!("a" => &a, "b" => &b)?;
    assert_eq!(remove_outliers(a_first)?.height(), 6);

    // On the full table `b` has no outliers, so only `a` removes rows.
    let b_first = df!("b" => &b, "a" => &a)?;
    assert_eq!(remove_outliers(b_first)?.height(), 8);
    Ok(())
}

#[test]
fn test_remove_outliers_drops_null_rows_and_skips_empty_columns() -> Result<()> {
    let df = df!(
        "v" => &[Some(1.0), Some(2.0), None, Some(3.0)],
        "empty" => &[None::<f64>, None, None, None]
    )?;

    let out = remove_outliers(df)?;

    assert_eq!(out.height(), 3);
    Ok(())
}

#[test]
fn test_convert_to_lowercase_is_idempotent() -> Result<()> {
    let df = df!(
        "name" => &["ALICE", "Bob", "ÉMILE"],
        "n" => &[1, 2, 3]
    )?;

    let once = convert_to_lowercase(df)?;
    let twice = convert_to_lowercase(once.clone())?;

    assert_eq!(
        str_values(&once, "name")?,
        vec![
            Some("alice".to_owned()),
            Some("bob".to_owned()),
            Some("émile".to_owned())
        ]
    );
    assert_eq!(once.column("n")?.dtype(), &DataType::Int32);
    assert!(once.equals(&twice));
    Ok(())
}

#[test]
fn test_convert_to_lowercase_handles_categoricals() -> Result<()> {
    let tag = Series::new("tag".into(), &["ABC", "Def", "ABC"])
        .cast(&DataType::Categorical(None, CategoricalOrdering::Physical))?
        .into_column();
    let df = DataFrame::new(vec![tag])?;

    let out = convert_to_lowercase(df)?;

    assert!(
        matches!(out.column("tag")?.dtype(), DataType::Categorical(_, _)),
        "column stays categorical, got {}",
        out.column("tag")?.dtype()
    );
    assert_eq!(
        str_values(&out, "tag")?,
        vec![
            Some("abc".to_owned()),
            Some("def".to_owned()),
            Some("abc".to_owned())
        ]
    );
    Ok(())
}

#[test]
fn test_clean_text_columns_defaults_to_every_text_column() -> Result<()> {
    let df = df!(
        "note" => &["  Hello,   World!! ", "Tabs\tand\nlines"],
        "code" => &["A-1", "B_2"],
        "n" => &[1, 2]
    )?;

    let out = clean_text_columns(df, None)?;

    assert_eq!(
        str_values(&out, "note")?,
        vec![Some("hello world".to_owned()), Some("tabs and lines".to_owned())]
    );
    assert_eq!(
        str_values(&out, "code")?,
        vec![Some("a1".to_owned()), Some("b_2".to_owned())]
    );
    assert_eq!(out.column("n")?.dtype(), &DataType::Int32);
    Ok(())
}

#[test]
fn test_clean_text_columns_skips_absent_columns() -> Result<()> {
    let df = df!(
        "keep" => &["  Mixed Case "],
        "clean" => &["  Mixed Case "]
    )?;

    let step = clean_text_columns_in(vec!["clean".to_owned(), "missing".to_owned()]);
    let out = step(df)?;

    assert_eq!(str_values(&out, "clean")?, vec![Some("mixed case".to_owned())]);
    assert_eq!(str_values(&out, "keep")?, vec![Some("  Mixed Case ".to_owned())]);
    assert_eq!(out.width(), 2);
    Ok(())
}

#[test]
fn test_clean_text_keeps_nulls() -> Result<()> {
    let df = df!("t" => &[Some(" A "), None])?;
    let out = clean_text_columns(df, None)?;
    assert_eq!(out.column("t")?.null_count(), 1);
    assert_eq!(str_values(&out, "t")?.first().cloned().unwrap(), Some("a".to_owned()));
    Ok(())
}
