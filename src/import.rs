//! Pulls HTML tables off a page so their first column can be imported as
//! kokoro names.

use reqwest::{header, Client};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlTable {
    /// Leading row made only of `<th>` cells, if any.
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .filter(|cell| !cell.is_empty())
            .cloned()
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("page returned {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct TableFetcher {
    client: Client,
}

impl TableFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Every table on the page. Network and status failures yield an empty
    /// list.
    pub async fn fetch_tables(&self, url: &str) -> Vec<HtmlTable> {
        match self.fetch_page(url).await {
            Ok(body) => {
                let tables = parse_tables(&body);
                info!(url, tables = tables.len(), "fetched import preview");
                tables
            }
            Err(err) => {
                warn!(url, "import fetch failed: {err}");
                Vec::new()
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, ImportError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::Status(status.as_u16()));
        }
        // Decodes with the charset from Content-Type, falling back to UTF-8.
        Ok(response.text().await?)
    }
}

pub fn parse_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);
    let (Ok(table_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("th, td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&table_sel)
        .filter_map(|table| {
            let mut parsed = HtmlTable::default();
            for row in table.select(&row_sel) {
                // Rows of nested tables belong to the inner table.
                let owner = row
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name() == "table");
                if owner != Some(table) {
                    continue;
                }
                let cells: Vec<ElementRef> = row
                    .select(&cell_sel)
                    .filter(|cell| cell.parent().and_then(ElementRef::wrap) == Some(row))
                    .collect();
                if cells.is_empty() {
                    continue;
                }
                let text: Vec<String> = cells.iter().map(|cell| cell_text(*cell)).collect();
                let all_headers = cells.iter().all(|cell| cell.value().name() == "th");
                if all_headers && parsed.header.is_empty() && parsed.rows.is_empty() {
                    parsed.header = text;
                } else {
                    parsed.rows.push(text);
                }
            }
            (!parsed.header.is_empty() || !parsed.rows.is_empty()).then_some(parsed)
        })
        .collect()
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
