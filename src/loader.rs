//! Source discovery and file-type dispatch.
//!
//! The loader turns a logical source (one file name, or every file in the raw
//! directory) into a [`Datasets`] collection. Each file is read with the reader
//! registered for its extension and then passed through [`basic_cleaning`], so
//! every table leaves the loader with trimmed, lowercased column names and
//! nulls where the source had empty strings.

pub mod spreadsheet;

use crate::error::{Result, ResultExt as _, TabcleanError};
use crate::types::Datasets;
use polars::prelude::*;
use std::path::{Path, PathBuf};

/// Which raw files to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Every file in the raw directory.
    All,
    /// A single file, relative to the raw directory.
    File(String),
}

impl Source {
    /// `"all"` selects every file; anything else names a single file.
    pub fn parse(name: &str) -> Self {
        if name == "all" {
            Self::All
        } else {
            Self::File(name.to_owned())
        }
    }
}

/// Reader families, dispatched by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
    Json,
    JsonLines,
    Parquet,
}

impl FileFormat {
    /// Resolve the reader for `path`. The error names the extension with its
    /// leading dot (`.txt`), or an empty string when the file has none.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| format!(".{}", s.to_lowercase()))
            .unwrap_or_default();

        match ext.as_str() {
            ".csv" => Ok(Self::Csv),
            ".xlsx" | ".xls" => Ok(Self::Spreadsheet),
            ".json" => Ok(Self::Json),
            ".jsonl" | ".ndjson" => Ok(Self::JsonLines),
            ".parquet" => Ok(Self::Parquet),
            _ => Err(TabcleanError::UnsupportedFormat(ext)),
        }
    }
}

/// Loads raw files from a single directory.
#[derive(Debug, Clone)]
pub struct DataLoader {
    raw_dir: PathBuf,
}

impl DataLoader {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Load the selected source files into named tables.
    ///
    /// Every file's format is resolved before anything is read, so an
    /// unsupported file aborts the load without partial results.
    ///
    /// # Errors
    ///
    /// Returns [`TabcleanError::UnsupportedFormat`] for an unknown extension,
    /// [`TabcleanError::Io`] if the directory cannot be listed, and a
    /// contextual error if a reader fails.
    pub fn load_data(&self, source: &Source) -> Result<Datasets> {
        let files = self.source_files(source)?;

        let plan = files
            .into_iter()
            .map(|path| FileFormat::from_path(&path).map(|format| (path, format)))
            .collect::<Result<Vec<_>>>()?;

        let mut datasets = Datasets::new();
        for (path, format) in plan {
            let name = dataset_name(&path);
            let df = read_table(&path, format)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            tracing::info!(
                dataset = %name,
                rows = df.height(),
                columns = df.width(),
                "Loaded dataset"
            );
            datasets.insert(name, df);
        }

        Ok(datasets)
    }

    fn source_files(&self, source: &Source) -> Result<Vec<PathBuf>> {
        match source {
            Source::File(name) => Ok(vec![self.raw_dir.join(name)]),
            Source::All => {
                let mut files = Vec::new();
                for entry in std::fs::read_dir(&self.raw_dir).with_context(|| {
                    format!("Failed to list raw directory {}", self.raw_dir.display())
                })? {
                    let path = entry?.path();
                    if path.is_file() {
                        files.push(path);
                    }
                }
                files.sort();
                Ok(files)
            }
        }
    }
}

/// Dataset name for a source path: the file name with every `.` replaced by `_`.
pub fn dataset_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().replace('.', "_"))
        .unwrap_or_default()
}

/// Read one file with the reader for `format` and apply [`basic_cleaning`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn read_table(path: &Path, format: FileFormat) -> Result<DataFrame> {
    let df = match format {
        FileFormat::Csv => LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10_000))
            .with_has_header(true)
            .with_try_parse_dates(true)
            .finish()?
            .collect()?,
        FileFormat::Parquet => ParquetReader::new(std::fs::File::open(path)?).finish()?,
        FileFormat::Json => {
            let df = JsonReader::new(std::fs::File::open(path)?).finish()?;
            try_parse_temporal_columns(df)?
        }
        FileFormat::JsonLines => {
            let df = JsonLineReader::from_path(path)?.finish()?;
            try_parse_temporal_columns(df)?
        }
        FileFormat::Spreadsheet => spreadsheet::read_spreadsheet(path)?,
    };

    basic_cleaning(df)
}

/// Trim and lowercase column names; turn empty strings into nulls.
///
/// # Errors
///
/// Fails if two columns collapse to the same name after normalisation.
pub fn basic_cleaning(mut df: DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    df.set_column_names(names)?;

    let exprs: Vec<Expr> = df
        .get_columns()
        .iter()
        .map(|c| {
            let name = c.name().as_str();
            if c.dtype() == &DataType::String {
                when(col(name).eq(lit("")))
                    .then(lit(NULL).cast(DataType::String))
                    .otherwise(col(name))
                    .alias(name)
            } else {
                col(name)
            }
        })
        .collect();

    Ok(df.lazy().select(exprs).collect()?)
}

/// Replace text columns with datetimes when most of their values parse.
///
/// JSON readers hand timestamps back as strings; CSV sources get the same
/// treatment from the reader's own date inference.
fn try_parse_temporal_columns(mut df: DataFrame) -> Result<DataFrame> {
    let candidates: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect();

    for name in candidates {
        let column = df.column(&name)?;
        let present = column.len() - column.null_count();
        if present == 0 {
            continue;
        }

        let options = StrptimeOptions {
            strict: false,
            ..Default::default()
        };
        let parse = col(name.as_str())
            .str()
            .to_datetime(Some(TimeUnit::Milliseconds), None, options, lit("raise"));
        // no recognisable format in the first values
        let Ok(out) = df.clone().lazy().select([parse]).collect() else {
            continue;
        };

        let parsed = out.column(&name)?;
        if (parsed.len() - parsed.null_count()) * 2 > present {
            let parsed = parsed.as_materialized_series().clone();
            df.replace(&name, parsed)?;
        }
    }

    Ok(df)
}
