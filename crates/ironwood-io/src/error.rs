//! I/O error types for ironwood-io.

use std::path::PathBuf;

use ironwood_id3::TreeError;

/// Errors from reading and normalizing example files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the file holds zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the file.
        path: PathBuf,
    },

    /// Returned when a row has a different number of columns than the first row.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of this row.
        got: usize,
    },

    /// Returned when a numeric column holds a cell that is neither the missing
    /// token nor a finite number.
    #[error("invalid numeric value in {path}: row {row_index}, column {col_index}, raw value \"{raw}\"")]
    InvalidNumericCell {
        /// Path to the file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
        /// The raw cell text.
        raw: String,
    },

    /// Returned when the weight column holds something other than a finite,
    /// non-negative number.
    #[error("invalid weight in {path}: row {row_index}, raw value \"{raw}\"")]
    InvalidWeight {
        /// Path to the file.
        path: PathBuf,
        /// Zero-based row index.
        row_index: usize,
        /// The raw cell text.
        raw: String,
    },

    /// Returned when the parsed rows do not form a valid example set.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
