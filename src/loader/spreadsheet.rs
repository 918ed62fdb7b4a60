//! Spreadsheet sources (`.xlsx`, `.xls`).
//!
//! Only the first worksheet is read. Its first row is the header; every
//! following row is a record. Each column is typed from its non-blank cells:
//! all integers become `Int64`, any mix of integers and floats becomes
//! `Float64`, all booleans become `Boolean`, all dates become
//! `Datetime(ms)`, and anything else falls back to text.

use crate::error::{Result, TabcleanError};
use calamine::{Data, Reader as _, open_workbook_auto};
use chrono::NaiveDateTime;
use polars::prelude::*;
use std::path::Path;

pub fn read_spreadsheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        TabcleanError::Spreadsheet(format!("{} has no worksheets", path.display()))
    })??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{i}"),
            other => other.to_string(),
        })
        .collect();
    let body: Vec<&[Data]> = rows.collect();

    let columns = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(i)).collect();
            build_column(name, &cells)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DataFrame::new(columns)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Bool,
    DateTime,
    Text,
}

fn cell_kind(cell: &Data) -> Option<CellKind> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::Int(_) => Some(CellKind::Int),
        Data::Float(_) => Some(CellKind::Float),
        Data::Bool(_) => Some(CellKind::Bool),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(CellKind::DateTime),
        _ => Some(CellKind::Text),
    }
}

/// Narrowest kind that holds every non-blank cell.
fn column_kind(cells: &[Option<&Data>]) -> CellKind {
    let mut kind: Option<CellKind> = None;
    for cell_kind in cells.iter().flatten().filter_map(|c| cell_kind(c)) {
        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(CellKind::Int | CellKind::Float), CellKind::Int | CellKind::Float) => {
                CellKind::Float
            }
            _ => return CellKind::Text,
        });
    }
    kind.unwrap_or(CellKind::Text)
}

fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime(),
        Data::DateTimeIso(s) => s.parse::<NaiveDateTime>().ok(),
        _ => None,
    }
}

fn build_column(name: &str, cells: &[Option<&Data>]) -> Result<Column> {
    let series = match column_kind(cells) {
        CellKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Some(Data::Int(v)) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Some(Data::Int(v)) => Some(*v as f64),
                    Some(Data::Float(v)) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Some(Data::Bool(v)) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        CellKind::DateTime => {
            let millis: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(cell_datetime).map(|dt| dt.and_utc().timestamp_millis()))
                .collect();
            Series::new(name.into(), millis)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|c| match c {
                    None | Some(Data::Empty) => None,
                    Some(cell) => Some(cell.to_string()),
                })
                .collect();
            Series::new(name.into(), values)
        }
    };

    Ok(series.into_column())
}
