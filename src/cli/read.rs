use super::{Session, run_until_interrupted};
use crate::error::Result;
use crate::models::SheetRange;
use crate::sheets::SpreadsheetOperations;
use crate::usecase::{run_cancellable, spawn_use_case};
use clap::Args;
use std::io;

const READ_RANGE: &str = "read range";

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Spreadsheet to read (defaults to sheets.spreadsheet_id)
    #[arg(long)]
    pub spreadsheet_id: Option<String>,

    /// Range such as "Sheet1!A1:C10", or a sheet name for the whole sheet
    #[arg(long)]
    pub range: String,
}

impl ReadArgs {
    pub async fn execute(&self, session: &Session) -> Result<()> {
        let spreadsheet_id = session.spreadsheet_id(self.spreadsheet_id.as_deref())?;
        let range: SheetRange = self.range.parse()?;
        let client = session.client.clone();

        let handle = spawn_use_case(READ_RANGE, move |cancel| async move {
            run_cancellable(
                READ_RANGE,
                &cancel,
                client.read_range(&spreadsheet_id, &range),
            )
            .await
        });
        let rows = run_until_interrupted(handle).await?;

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(io::stdout());
        for row in rows.rows() {
            writer.write_record(row)?;
        }
        writer.flush()?;

        Ok(())
    }
}
