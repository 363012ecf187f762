use super::{Session, run_until_interrupted};
use crate::error::Result;
use crate::sheets::SpreadsheetOperations;
use crate::usecase::{run_cancellable, spawn_use_case};
use clap::Args;
use tracing::info;

const CREATE_SPREADSHEET: &str = "create spreadsheet";

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Title of the new spreadsheet
    #[arg(long)]
    pub title: String,
}

impl CreateArgs {
    pub async fn execute(&self, session: &Session) -> Result<()> {
        let client = session.client.clone();
        let title = self.title.clone();

        let handle = spawn_use_case(CREATE_SPREADSHEET, move |cancel| async move {
            run_cancellable(
                CREATE_SPREADSHEET,
                &cancel,
                client.create_spreadsheet(&title),
            )
            .await
        });
        let id = run_until_interrupted(handle).await?;

        info!(spreadsheet_id = %id, url = %id.url(), "Spreadsheet created");

        Ok(())
    }
}
