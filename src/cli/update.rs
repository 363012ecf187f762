use super::{Session, run_until_interrupted};
use crate::error::{AppError, Result};
use crate::models::{RowBatch, SheetRange, ValueInputMode};
use crate::sheets::SpreadsheetOperations;
use crate::usecase::{run_cancellable, spawn_use_case};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

const BATCH_UPDATE: &str = "batch update";

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Spreadsheet to update (defaults to sheets.spreadsheet_id)
    #[arg(long)]
    pub spreadsheet_id: Option<String>,

    /// Target range such as "Sheet1!A1:B3"; repeat for more ranges
    #[arg(long = "range", required = true)]
    pub ranges: Vec<String>,

    /// Header-less CSV file for the range in the same position
    #[arg(long = "csv", required = true)]
    pub csv_files: Vec<PathBuf>,

    /// Parse values as if typed into the UI instead of storing them raw
    #[arg(long)]
    pub user_entered: bool,
}

impl UpdateArgs {
    fn updates(&self) -> Result<Vec<(SheetRange, RowBatch)>> {
        if self.ranges.len() != self.csv_files.len() {
            return Err(AppError::InvalidInput(format!(
                "Got {} ranges but {} CSV files; pass one --csv per --range",
                self.ranges.len(),
                self.csv_files.len()
            )));
        }

        self.ranges
            .iter()
            .zip(&self.csv_files)
            .map(|(range, path)| -> Result<(SheetRange, RowBatch)> {
                let range = range.parse::<SheetRange>()?;
                let rows = RowBatch::from_csv_reader(File::open(path)?)?;
                Ok((range, rows))
            })
            .collect()
    }

    pub async fn execute(&self, session: &Session) -> Result<()> {
        let spreadsheet_id = session.spreadsheet_id(self.spreadsheet_id.as_deref())?;
        let updates = self.updates()?;
        let value_input_mode = match self.user_entered {
            true => ValueInputMode::UserEntered,
            false => ValueInputMode::Raw,
        };
        let client = session.client.clone();

        let handle = spawn_use_case(BATCH_UPDATE, move |cancel| async move {
            run_cancellable(
                BATCH_UPDATE,
                &cancel,
                client.batch_update_ranges(&spreadsheet_id, &updates, value_input_mode),
            )
            .await
        });
        let result = run_until_interrupted(handle).await?;

        info!(
            updated_rows = result.affected_rows(),
            updated_cells = result.updated_cells,
            "Batch update completed"
        );

        Ok(())
    }
}
