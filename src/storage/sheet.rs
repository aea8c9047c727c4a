//! Google Sheets backend: one spreadsheet, one worksheet per table.

use super::{RawTable, StorageError};
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Client, Response,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetConfig {
    pub api_base: String,
    pub spreadsheet_id: String,
    pub access_token: String,
}

/// Authenticated handle to one spreadsheet. Built once at startup and owned
/// by the application state; the credentials are attached to every request
/// by the inner client.
#[derive(Debug, Clone)]
pub struct SheetStore {
    client: Client,
    spreadsheet_url: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetStore {
    pub fn connect(config: &SheetConfig) -> Result<Self, StorageError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.access_token))
            .map_err(|_| StorageError::InvalidCredentials)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self {
            client,
            spreadsheet_url: format!(
                "{}/v4/spreadsheets/{}",
                config.api_base.trim_end_matches('/'),
                config.spreadsheet_id
            ),
        })
    }

    /// Reads every row of the worksheet, creating it with `header` first if it
    /// does not exist. `Ok(None)` when the worksheet was just created or has
    /// no header row; a header with no rows is an empty table.
    pub async fn read(&self, table: &str, header: &[&str]) -> Result<Option<RawTable>, StorageError> {
        if self.ensure_worksheet(table, header).await? {
            return Ok(None);
        }

        let response = self
            .client
            .get(format!("{}/values/{table}", self.spreadsheet_url))
            .send()
            .await?;
        let range: ValueRange = check(response).await?.json().await?;

        let mut values = range.values.into_iter();
        let Some(header) = values.next() else {
            return Ok(None);
        };
        Ok(Some(RawTable {
            header,
            rows: values.collect(),
        }))
    }

    /// Clears the worksheet and writes the header plus all rows.
    pub async fn write(&self, table: &str, raw: &RawTable) -> Result<(), StorageError> {
        let header: Vec<&str> = raw.header.iter().map(String::as_str).collect();
        self.ensure_worksheet(table, &header).await?;

        let response = self
            .client
            .post(format!("{}/values/{table}:clear", self.spreadsheet_url))
            .json(&json!({}))
            .send()
            .await?;
        check(response).await?;

        let mut values = Vec::with_capacity(raw.rows.len() + 1);
        values.push(raw.header.clone());
        values.extend(raw.rows.iter().cloned());
        self.put_values(table, values).await
    }

    async fn worksheet_titles(&self) -> Result<Vec<String>, StorageError> {
        let response = self
            .client
            .get(&self.spreadsheet_url)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;
        let meta: SpreadsheetMeta = check(response).await?.json().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    /// Returns `true` when the worksheet had to be created.
    async fn ensure_worksheet(&self, table: &str, header: &[&str]) -> Result<bool, StorageError> {
        if self.worksheet_titles().await?.iter().any(|title| title == table) {
            return Ok(false);
        }

        let response = self
            .client
            .post(format!("{}:batchUpdate", self.spreadsheet_url))
            .json(&json!({
                "requests": [{ "addSheet": { "properties": { "title": table } } }]
            }))
            .send()
            .await?;
        check(response).await?;

        let header_row = header.iter().map(|column| column.to_string()).collect();
        self.put_values(table, vec![header_row]).await?;
        info!(worksheet = table, "created worksheet");
        Ok(true)
    }

    async fn put_values(&self, table: &str, values: Vec<Vec<String>>) -> Result<(), StorageError> {
        let body = ValueRange {
            major_dimension: Some("ROWS".to_string()),
            values,
        };
        let response = self
            .client
            .put(format!("{}/values/{table}!A1", self.spreadsheet_url))
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StorageError::Api {
        status: status.as_u16(),
        body,
    })
}
