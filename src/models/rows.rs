use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Ordered rows of string cells. Rows may differ in length; an empty row
/// writes nothing to its cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowBatch(Vec<Vec<String>>);

impl RowBatch {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self(rows)
    }

    /// Read rows from header-less CSV; records may have any number of fields.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self(rows))
    }

    /// Parse one comma-separated row per argument. An empty argument is an empty row.
    pub fn from_delimited_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        let mut parsed = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.is_empty() {
                parsed.push(Vec::new());
                continue;
            }

            let mut batch = Self::from_csv_reader(row.as_bytes())?;
            match batch.0.len() {
                1 => parsed.push(batch.0.remove(0)),
                _ => {
                    return Err(AppError::InvalidInput(format!(
                        "Row {} must be a single line",
                        idx + 1
                    )));
                }
            }
        }

        Ok(Self(parsed))
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rows with at least one cell.
    pub fn populated_rows(&self) -> usize {
        self.0.iter().filter(|row| !row.is_empty()).count()
    }

    pub fn cell_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.0
    }
}

impl From<Vec<Vec<String>>> for RowBatch {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self(rows)
    }
}

impl From<Vec<Vec<&str>>> for RowBatch {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self(
            rows.into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}
