//! Error type shared by the loader, validator and flow.
//!
//! Step functions inside a pipeline return [`anyhow::Result`] and have their
//! failures recorded as text. Everything that is allowed to abort a run
//! (unsupported source files, unreadable data, a failed validation pass)
//! surfaces as a [`TabcleanError`].
//!
//! ```
//! use tabclean::error::TabcleanError;
//!
//! let err = TabcleanError::UnsupportedFormat(".txt".to_owned());
//! assert_eq!(err.to_string(), "Unsupported file type: .txt");
//! ```

use std::fmt;

/// Main error type for tabclean operations.
#[derive(Debug)]
pub enum TabcleanError {
    /// I/O errors (missing raw directory, unreadable file)
    Io(std::io::Error),

    /// Polars failed while reading or reshaping a table
    DataProcessing(String),

    /// Source file extension has no registered reader
    UnsupportedFormat(String),

    /// Spreadsheet could not be opened or has no usable sheet
    Spreadsheet(String),

    /// A column failed its type check
    Validation(String),

    /// Configuration could not be read or parsed
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for TabcleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::DataProcessing(msg) => write!(f, "Data processing error: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file type: {ext}"),
            Self::Spreadsheet(msg) => write!(f, "Spreadsheet error: {msg}"),
            Self::Validation(msg) => write!(f, "Validation failed: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TabcleanError {}

impl From<std::io::Error> for TabcleanError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<anyhow::Error> for TabcleanError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for TabcleanError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

impl From<polars::error::PolarsError> for TabcleanError {
    fn from(err: polars::error::PolarsError) -> Self {
        Self::DataProcessing(err.to_string())
    }
}

impl From<calamine::Error> for TabcleanError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

/// Result type alias for tabclean operations.
pub type Result<T> = std::result::Result<T, TabcleanError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TabcleanError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: TabcleanError = e.into();
            TabcleanError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: TabcleanError = e.into();
            TabcleanError::Other(format!("{}: {}", f(), err))
        })
    }
}
