use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while ingesting the attribution events file.
///
/// Any of these aborts the run; the dashboard surfaces them as a blocking
/// message.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input contained no header line at all.
    #[error("Input is empty: no header row found")]
    MissingHeader,

    /// The header does not consist of exactly the expected five columns.
    #[error("Schema mismatch: missing columns {missing:?}, unexpected columns {unexpected:?}")]
    SchemaMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// A data row has a different number of fields than the header.
    #[error("Malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Low-level CSV decoding failure (invalid UTF-8, broken quoting, ...).
    #[error("Failed to decode CSV: {0}")]
    Csv(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A recoverable, per-row parse failure.
///
/// The offending field is nulled and the row is retained; warnings are only
/// counted and logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A non-empty revenue value that is not a finite number.
    UnparsableRevenue { line: u64, value: String },
    /// A timestamp string that matched no accepted format.
    UnparsableTimestamp { line: u64, value: String },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnparsableRevenue { line, value } => {
                write!(f, "line {}: unparsable revenue \"{}\"", line, value)
            }
            ParseWarning::UnparsableTimestamp { line, value } => {
                write!(f, "line {}: unparsable timestamp \"{}\"", line, value)
            }
        }
    }
}

/// Convenience alias used throughout the attribution crates.
pub type Result<T> = std::result::Result<T, IngestError>;
