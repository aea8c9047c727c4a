use super::{RawTable, StorageError};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// One CSV file per table under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    /// `Ok(None)` when the table file does not exist yet.
    pub async fn read(&self, table: &str) -> Result<Option<RawTable>, StorageError> {
        let path = self.path_for(table);
        match fs::read(&path).await {
            Ok(bytes) => decode_csv(&bytes).map(Some),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn write(&self, table: &str, raw: &RawTable) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(table);
        fs::write(&path, encode_csv(raw)?).await?;
        debug!(path = %path.display(), rows = raw.rows.len(), "wrote table");
        Ok(())
    }
}

pub(crate) fn encode_csv(raw: &RawTable) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&raw.header)?;
    for row in &raw.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| StorageError::Io(err.into_error()))
}

pub(crate) fn decode_csv(bytes: &[u8]) -> Result<RawTable, StorageError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let header = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|record| record.map(|record| record.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;
    Ok(RawTable { header, rows })
}
