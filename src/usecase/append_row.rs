use super::{UseCaseError, run_cancellable};
use crate::error::AppError;
use crate::models::{AppendOptions, RowBatch, SheetRange, SpreadsheetId, UpdateResult};
use crate::sheets::SpreadsheetOperations;
use indicatif::ProgressStyle;
use tokio_util::sync::CancellationToken;
use tracing::{Span, info, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

pub const APPEND_ROW: &str = "append row";

/// Append `rows` after the last populated row of `sheet_name`.
///
/// Terminal on the first error; nothing is retried.
#[instrument(
    name = "Append row",
    skip_all,
    fields(spreadsheet_id = %spreadsheet_id, sheet = sheet_name)
)]
pub async fn run_append_row_use_case<C>(
    client: &C,
    spreadsheet_id: &SpreadsheetId,
    sheet_name: &str,
    rows: &RowBatch,
    options: AppendOptions,
    cancel: &CancellationToken,
) -> Result<UpdateResult, UseCaseError>
where
    C: SpreadsheetOperations + ?Sized,
{
    let span = Span::current();
    span.pb_set_style(&ProgressStyle::default_spinner());
    span.pb_set_message(&format!("Appending {} rows", rows.len()));

    if sheet_name.is_empty() {
        return Err(UseCaseError::Failed {
            use_case: APPEND_ROW,
            source: AppError::InvalidInput("Sheet name must not be empty".to_string()),
        });
    }

    let range = SheetRange::new(sheet_name, "A1");
    let result = run_cancellable(
        APPEND_ROW,
        cancel,
        client.append_rows(spreadsheet_id, &range, rows, options),
    )
    .await?;

    info!(new_rows = result.affected_rows(), "Rows appended");

    Ok(result)
}
