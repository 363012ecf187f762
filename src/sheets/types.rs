use crate::error::AppError;
use crate::models::{RowBatch, UpdateResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets/create
#[derive(Debug, Serialize)]
pub(super) struct CreateSpreadsheetRequest<'a> {
    pub(super) properties: SpreadsheetProperties<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct SpreadsheetProperties<'a> {
    pub(super) title: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SpreadsheetResponse {
    pub(super) spreadsheet_id: Option<String>,
    pub(super) spreadsheet_url: Option<String>,
}

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values#ValueRange
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ValueRange<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) major_dimension: Option<String>,
    #[serde(default)]
    pub(super) values: std::borrow::Cow<'a, RowBatch>,
}

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/append
#[derive(Debug, Deserialize)]
pub(super) struct AppendValuesResponse {
    pub(super) updates: Option<UpdateValuesResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateValuesResponse {
    pub(super) updated_range: Option<String>,
    pub(super) updated_rows: Option<u64>,
    pub(super) updated_cells: Option<u64>,
}

impl From<UpdateValuesResponse> for UpdateResult {
    fn from(response: UpdateValuesResponse) -> Self {
        UpdateResult {
            updated_rows: response.updated_rows.unwrap_or_default(),
            updated_cells: response.updated_cells.unwrap_or_default(),
            updated_range: response.updated_range,
        }
    }
}

// https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/batchUpdate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BatchUpdateValuesRequest<'a> {
    pub(super) value_input_option: &'static str,
    pub(super) data: Vec<ValueRange<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct BatchUpdateValuesResponse {
    pub(super) total_updated_rows: Option<u64>,
    pub(super) total_updated_cells: Option<u64>,
}

impl From<BatchUpdateValuesResponse> for UpdateResult {
    fn from(response: BatchUpdateValuesResponse) -> Self {
        UpdateResult {
            updated_rows: response.total_updated_rows.unwrap_or_default(),
            updated_cells: response.total_updated_cells.unwrap_or_default(),
            updated_range: None,
        }
    }
}

// https://cloud.google.com/apis/design/errors#http_mapping
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

// Unknown sheet names come back as 400 with this message rather than 404.
const UNKNOWN_RANGE_PREFIX: &str = "Unable to parse range";

/// Map a non-success response to the error taxonomy.
pub(super) fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Auth(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::BAD_REQUEST if message.starts_with(UNKNOWN_RANGE_PREFIX) => {
            AppError::NotFound(message)
        }
        _ => AppError::Api {
            status: status.as_u16(),
            message,
        },
    }
}
