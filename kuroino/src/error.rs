//! Error types for sheet loading and validation.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// An entry does not carry one attend slot per date column.
    #[error("entry {row} ({name}) has {len} attend slots, expected {expected}")]
    Ragged {
        row: usize,
        name: String,
        len: usize,
        expected: usize,
    },

    #[error("{days} days from {start} run past the last representable date")]
    DateRange {
        start: chrono::NaiveDate,
        days: u32,
    },

    #[error("cell size must be positive, got {0}")]
    CellSize(i32),

    #[error("sheet file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
