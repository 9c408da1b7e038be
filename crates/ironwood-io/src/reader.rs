//! Headerless delimited example reader.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ironwood_id3::{Dataset, Value, WeightColumn};
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads labeled examples from a delimited text file.
///
/// Expected format:
/// - No header row
/// - `a0,a1,...,an,label` per line, or `a0,...,an,label,weight` when the
///   weight column is enabled
/// - Every row has the same number of columns
///
/// Fields are trimmed. Columns listed with [`with_numeric_columns`] become
/// [`Value::Number`]; every other cell, and any cell equal to the missing
/// token, stays a [`Value::Category`]. Without a weight column every example
/// weighs 1.
///
/// [`with_numeric_columns`]: ExampleReader::with_numeric_columns
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::InconsistentRowLength`] | Row has a different column count than the first row |
/// | [`IoError::InvalidNumericCell`] | Numeric cell is NaN, Inf, or unparseable |
/// | [`IoError::InvalidWeight`] | Weight cell is negative, non-finite, or unparseable |
/// | [`IoError::Tree`] | Rows too short to hold an attribute and a label |
#[derive(Debug, Clone)]
pub struct ExampleReader {
    path: PathBuf,
    delimiter: u8,
    numeric_columns: BTreeSet<usize>,
    missing_token: Option<String>,
    weighted: bool,
}

impl ExampleReader {
    /// Create a comma-delimited, unweighted reader for the given path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: b',',
            numeric_columns: BTreeSet::new(),
            missing_token: None,
            weighted: false,
        }
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Parse the given zero-based columns as numbers.
    #[must_use]
    pub fn with_numeric_columns(mut self, columns: impl IntoIterator<Item = usize>) -> Self {
        self.numeric_columns = columns.into_iter().collect();
        self
    }

    /// Keep cells equal to `token` categorical even in numeric columns, so
    /// missing-value repair can fill them.
    #[must_use]
    pub fn with_missing_token(mut self, token: Option<String>) -> Self {
        self.missing_token = token;
        self
    }

    /// Treat the last column as the example weight.
    #[must_use]
    pub fn with_weight_column(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    /// Return the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display(), weighted = self.weighted))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so a short row reports InconsistentRowLength rather
        // than a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(self.delimiter)
            .from_reader(file);

        let mut rows: Vec<Vec<Value>> = Vec::new();
        let mut expected_cols = None;

        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            let expected = *expected_cols.get_or_insert(record.len());
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let n_values = if self.weighted {
                record.len().saturating_sub(1)
            } else {
                record.len()
            };
            let mut row = Vec::with_capacity(record.len());
            for (col_index, raw) in record.iter().take(n_values).enumerate() {
                row.push(self.cell(raw, row_index, col_index)?);
            }
            if self.weighted
                && let Some(raw) = record.get(n_values)
            {
                row.push(Value::Number(self.weight(raw, row_index)?));
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }
        debug!(n_rows = rows.len(), n_columns = ?expected_cols, "rows parsed");

        let weight_column = if self.weighted {
            WeightColumn::Present
        } else {
            WeightColumn::Absent
        };
        let dataset = Dataset::from_rows(rows, weight_column)?;

        info!(
            n_examples = dataset.len(),
            n_attributes = dataset.layout().n_attributes(),
            total_weight = dataset.total_weight(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    fn cell(&self, raw: &str, row_index: usize, col_index: usize) -> Result<Value, IoError> {
        if !self.numeric_columns.contains(&col_index)
            || self.missing_token.as_deref() == Some(raw)
        {
            return Ok(Value::category(raw));
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Value::Number(value)),
            _ => Err(IoError::InvalidNumericCell {
                path: self.path.clone(),
                row_index,
                col_index,
                raw: raw.to_string(),
            }),
        }
    }

    fn weight(&self, raw: &str, row_index: usize) -> Result<f64, IoError> {
        match raw.parse::<f64>() {
            Ok(weight) if weight.is_finite() && weight >= 0.0 => Ok(weight),
            _ => Err(IoError::InvalidWeight {
                path: self.path.clone(),
                row_index,
                raw: raw.to_string(),
            }),
        }
    }
}
