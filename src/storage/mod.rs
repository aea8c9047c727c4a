//! Table persistence. Every backend stores whole tables: a save replaces
//! everything previously stored under the table name.

pub mod file;
pub mod records;
pub mod sheet;

pub use file::FileStore;
pub use records::TableRecord;
pub use sheet::{SheetConfig, SheetStore};

use crate::config::Backend;
use std::collections::HashMap;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("sheets api returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("access token is not a valid header value")]
    InvalidCredentials,

    #[error("table '{table}' has no '{column}' column")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },

    #[error("table '{table}' has invalid {column} '{value}'")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        value: String,
    },
}

/// Untyped table as both backends see it: a header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn from_records<R: TableRecord>(records: &[R]) -> Self {
        Self {
            header: R::HEADER.iter().map(|column| column.to_string()).collect(),
            rows: records.iter().map(TableRecord::to_row).collect(),
        }
    }

    /// Maps cells to record fields by header name, so stored column order
    /// does not matter. Blank rows are skipped.
    pub fn into_records<R: TableRecord>(self) -> Result<Vec<R>, StorageError> {
        let positions: HashMap<String, usize> = self
            .header
            .iter()
            .enumerate()
            .map(|(index, name)| (name.trim().to_ascii_lowercase(), index))
            .collect();

        let columns = R::HEADER
            .iter()
            .map(|column| {
                positions
                    .get(*column)
                    .copied()
                    .ok_or(StorageError::MissingColumn {
                        table: R::TABLE,
                        column: *column,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.rows
            .into_iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                let ordered: Vec<String> = columns
                    .iter()
                    .map(|&index| row.get(index).cloned().unwrap_or_default())
                    .collect();
                R::from_row(&ordered)
            })
            .collect()
    }
}

/// Where tables live for this process.
pub enum Storage {
    /// Nothing is persisted; every load yields the defaults.
    Session,
    File(FileStore),
    Sheet(SheetStore),
}

impl Storage {
    /// Builds the configured backend. The sheet client is created here once
    /// and reused for every later call.
    pub fn connect(backend: &Backend) -> Result<Self, StorageError> {
        Ok(match backend {
            Backend::Session => Storage::Session,
            Backend::File(dir) => Storage::File(FileStore::new(dir.clone())),
            Backend::Sheet(config) => Storage::Sheet(SheetStore::connect(config)?),
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Storage::Session => "session",
            Storage::File(_) => "file",
            Storage::Sheet(_) => "sheet",
        }
    }

    /// Reads a whole table. Absent tables and any backend failure fall back
    /// to `default`.
    pub async fn load<R: TableRecord>(&self, default: Vec<R>) -> Vec<R> {
        let raw = match self {
            Storage::Session => return default,
            Storage::File(store) => store.read(R::TABLE).await,
            Storage::Sheet(store) => store.read(R::TABLE, R::HEADER).await,
        };

        match raw.and_then(|table| table.map(RawTable::into_records::<R>).transpose()) {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                debug!(table = R::TABLE, "no stored rows, using defaults");
                default
            }
            Err(err) => {
                error!(table = R::TABLE, backend = self.label(), "failed to load table: {err}");
                default
            }
        }
    }

    /// Overwrites the stored table with `rows`.
    pub async fn save<R: TableRecord>(&self, rows: &[R]) -> Result<(), StorageError> {
        let table = RawTable::from_records(rows);
        match self {
            Storage::Session => Ok(()),
            Storage::File(store) => store.write(R::TABLE, &table).await,
            Storage::Sheet(store) => store.write(R::TABLE, &table).await,
        }
    }
}

/// Renders a table as CSV text for download.
pub fn to_csv<R: TableRecord>(rows: &[R]) -> Result<String, StorageError> {
    let bytes = file::encode_csv(&RawTable::from_records(rows))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
