use super::SpreadsheetOperations;
use super::auth::Credential;
use super::types::{
    AppendValuesResponse, BatchUpdateValuesRequest, BatchUpdateValuesResponse,
    CreateSpreadsheetRequest, SpreadsheetProperties, SpreadsheetResponse, ValueRange,
    error_from_response,
};
use crate::config::SheetsConfig;
use crate::error::{AppError, Result};
use crate::models::{
    AppendOptions, RowBatch, SheetRange, SpreadsheetId, UpdateResult, ValueInputMode,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::{Host, Url};

pub struct SheetsClient {
    client: Client,
    api_base_url: Url,
    credential: Arc<dyn Credential>,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig, credential: Arc<dyn Credential>) -> Result<Self> {
        let api_base_url = Url::parse(&config.api_base_url).map_err(|e| {
            AppError::Config(format!(
                "Invalid api_base_url '{}': {}",
                config.api_base_url, e
            ))
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "api_base_url '{}' cannot be used as a base URL",
                api_base_url
            )));
        }

        let mut builder = reqwest::ClientBuilder::new().user_agent(&config.application_name);
        // Local emulators must not be routed through a system proxy
        if is_loopback(&api_base_url) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build reqwest client: {}", e)))?;

        Ok(Self {
            client,
            api_base_url,
            credential,
        })
    }

    pub fn account_identifier(&self) -> &str {
        self.credential.account_identifier()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Config(format!(
                    "api_base_url '{}' cannot be used as a base URL",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Authorize and send a request, decoding a JSON body on success.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let token = self.credential.bearer_token().await?;

        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AppError::Api {
            status: status.as_u16(),
            message: format!("Unexpected response body: {}", e),
        })
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost",
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[async_trait]
impl SpreadsheetOperations for SheetsClient {
    #[instrument(name = "Creating spreadsheet", skip(self))]
    async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetId> {
        let url = self.endpoint(&["spreadsheets"])?;
        let body = CreateSpreadsheetRequest {
            properties: SpreadsheetProperties { title },
        };

        let response: SpreadsheetResponse = self.send(self.client.post(url).json(&body)).await?;

        let spreadsheet_id = response.spreadsheet_id.ok_or_else(|| AppError::Api {
            status: 200,
            message: "Created spreadsheet has empty ID".to_string(),
        })?;
        debug!(
            spreadsheet_id = %spreadsheet_id,
            spreadsheet_url = ?response.spreadsheet_url,
            "Created spreadsheet"
        );

        Ok(SpreadsheetId::new(spreadsheet_id))
    }

    #[instrument(
        name = "Appending rows",
        skip_all,
        fields(spreadsheet_id = %id, range = %range, rows = rows.len())
    )]
    async fn append_rows(
        &self,
        id: &SpreadsheetId,
        range: &SheetRange,
        rows: &RowBatch,
        options: AppendOptions,
    ) -> Result<UpdateResult> {
        let url = self.endpoint(&[
            "spreadsheets",
            id.as_str(),
            "values",
            &format!("{}:append", range.to_a1()),
        ])?;
        let body = ValueRange {
            range: None,
            major_dimension: None,
            values: Cow::Borrowed(rows),
        };

        let request = self
            .client
            .post(url)
            .query(&[
                ("valueInputOption", options.value_input_mode.as_str()),
                ("insertDataOption", options.insert_mode.as_str()),
            ])
            .json(&body);
        let response: AppendValuesResponse = self.send(request).await?;

        let result: UpdateResult = response.updates.map(Into::into).unwrap_or_default();
        debug!(
            updated_rows = result.updated_rows,
            updated_range = ?result.updated_range,
            "Appended rows"
        );

        Ok(result)
    }

    #[instrument(
        name = "Batch updating ranges",
        skip_all,
        fields(spreadsheet_id = %id, ranges = updates.len())
    )]
    async fn batch_update_ranges(
        &self,
        id: &SpreadsheetId,
        updates: &[(SheetRange, RowBatch)],
        value_input_mode: ValueInputMode,
    ) -> Result<UpdateResult> {
        if updates.is_empty() {
            return Err(AppError::InvalidInput(
                "Batch update needs at least one range".to_string(),
            ));
        }

        let url = self.endpoint(&["spreadsheets", id.as_str(), "values:batchUpdate"])?;
        let body = BatchUpdateValuesRequest {
            value_input_option: value_input_mode.as_str(),
            data: updates
                .iter()
                .map(|(range, rows)| ValueRange {
                    range: Some(range.to_a1()),
                    major_dimension: None,
                    values: Cow::Borrowed(rows),
                })
                .collect(),
        };

        let response: BatchUpdateValuesResponse =
            self.send(self.client.post(url).json(&body)).await?;

        let result = UpdateResult::from(response);
        debug!(
            updated_rows = result.updated_rows,
            updated_cells = result.updated_cells,
            "Batch updated ranges"
        );

        Ok(result)
    }

    #[instrument(name = "Reading range", skip_all, fields(spreadsheet_id = %id, range = %range))]
    async fn read_range(&self, id: &SpreadsheetId, range: &SheetRange) -> Result<RowBatch> {
        let url = self.endpoint(&["spreadsheets", id.as_str(), "values", &range.to_a1()])?;

        let request = self.client.get(url).query(&[
            ("majorDimension", "ROWS"),
            ("valueRenderOption", "FORMATTED_VALUE"),
        ]);
        let response: ValueRange<'static> = self.send(request).await?;

        Ok(response.values.into_owned())
    }
}
