use super::{Session, run_until_interrupted};
use crate::error::{AppError, Result};
use crate::models::{AppendOptions, InsertMode, RowBatch, ValueInputMode};
use crate::usecase::{APPEND_ROW, run_append_row_use_case, spawn_use_case};
use clap::Args;
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct AppendArgs {
    /// Spreadsheet to append to (defaults to sheets.spreadsheet_id)
    #[arg(long)]
    pub spreadsheet_id: Option<String>,

    /// Name of the sheet (tab) inside the spreadsheet
    #[arg(long)]
    pub sheet: String,

    /// A comma-separated row; repeat for more rows. An empty value appends an empty row
    #[arg(long = "row")]
    pub rows: Vec<String>,

    /// Header-less CSV file with rows to append after any --row values
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Parse values as if typed into the UI instead of storing them raw
    #[arg(long)]
    pub user_entered: bool,

    /// Overwrite cells below the table instead of inserting new rows
    #[arg(long)]
    pub overwrite: bool,
}

impl AppendArgs {
    fn options(&self) -> AppendOptions {
        AppendOptions {
            value_input_mode: match self.user_entered {
                true => ValueInputMode::UserEntered,
                false => ValueInputMode::Raw,
            },
            insert_mode: match self.overwrite {
                true => InsertMode::Overwrite,
                false => InsertMode::InsertRows,
            },
        }
    }

    fn row_batch(&self) -> Result<RowBatch> {
        let mut rows = RowBatch::from_delimited_rows(&self.rows)?.into_rows();
        if let Some(path) = &self.csv {
            rows.extend(RowBatch::from_csv_reader(File::open(path)?)?.into_rows());
        }

        let batch = RowBatch::new(rows);
        if batch.is_empty() {
            return Err(AppError::InvalidInput(
                "Nothing to append: pass --row or --csv".to_string(),
            ));
        }

        Ok(batch)
    }

    pub async fn execute(&self, session: &Session) -> Result<()> {
        let spreadsheet_id = session.spreadsheet_id(self.spreadsheet_id.as_deref())?;
        let rows = self.row_batch()?;
        debug!(
            rows = rows.len(),
            populated_rows = rows.populated_rows(),
            cells = rows.cell_count(),
            "Prepared rows to append"
        );
        let options = self.options();
        let client = session.client.clone();
        let sheet = self.sheet.clone();

        let handle = spawn_use_case(APPEND_ROW, move |cancel| async move {
            run_append_row_use_case(
                client.as_ref(),
                &spreadsheet_id,
                &sheet,
                &rows,
                options,
                &cancel,
            )
            .await
        });
        let result = run_until_interrupted(handle).await?;

        info!(
            new_rows = result.affected_rows(),
            range = result.updated_range.as_deref().unwrap_or_default(),
            "Append completed"
        );

        Ok(())
    }
}
