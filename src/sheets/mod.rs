mod auth;
mod client;
mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use auth::{Credential, InstalledFlowCredential, StaticCredential};
pub use client::SheetsClient;

// Re-export for CLI usage
pub use auth::{clear_tokens as clear_google_tokens, token_cache_path as google_token_cache_path};

use crate::error::Result;
use crate::models::{AppendOptions, RowBatch, SheetRange, SpreadsheetId, UpdateResult, ValueInputMode};
use async_trait::async_trait;

/// Operations against a hosted spreadsheet service. Each call is one request
/// and keeps no state between calls.
#[async_trait]
pub trait SpreadsheetOperations: Send + Sync {
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetId>;

    /// Append after the last populated row of the table found at `range`.
    async fn append_rows(
        &self,
        id: &SpreadsheetId,
        range: &SheetRange,
        rows: &RowBatch,
        options: AppendOptions,
    ) -> Result<UpdateResult>;

    /// Write every range in one request; the service applies all or none.
    async fn batch_update_ranges(
        &self,
        id: &SpreadsheetId,
        updates: &[(SheetRange, RowBatch)],
        value_input_mode: ValueInputMode,
    ) -> Result<UpdateResult>;

    async fn read_range(&self, id: &SpreadsheetId, range: &SheetRange) -> Result<RowBatch>;
}
