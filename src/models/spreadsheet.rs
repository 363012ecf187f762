use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a remote spreadsheet, as returned by create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpreadsheetId(String);

impl SpreadsheetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.0)
    }
}

impl fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the service interprets written values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputMode {
    /// Stored exactly as given.
    #[default]
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas).
    UserEntered,
}

impl ValueInputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputMode::Raw => "RAW",
            ValueInputMode::UserEntered => "USER_ENTERED",
        }
    }
}

/// Whether appended rows shift existing data down or overwrite it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsertMode {
    #[default]
    InsertRows,
    Overwrite,
}

impl InsertMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertMode::InsertRows => "INSERT_ROWS",
            InsertMode::Overwrite => "OVERWRITE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOptions {
    pub value_input_mode: ValueInputMode,
    pub insert_mode: InsertMode,
}

/// Counts reported by the service for a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub updated_rows: u64,
    pub updated_cells: u64,
    pub updated_range: Option<String>,
}

impl UpdateResult {
    /// Rows the service reports as written: `updatedRows` for an append,
    /// `totalUpdatedRows` for a batch update. Cell totals are in
    /// `updated_cells`, so a batch of 5 rows holding 7 cells reports 5 here.
    pub fn affected_rows(&self) -> u64 {
        self.updated_rows
    }
}
