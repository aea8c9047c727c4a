use crate::checklist::Checklist;
use crate::collectibles::CollectibleTracker;
use crate::config::{Config, PacingDefaults};
use crate::history::History;
use crate::import::{HtmlTable, TableFetcher};
use crate::models::{default_collectibles, default_tasks};
use crate::storage::Storage;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory tables for the running process.
#[derive(Debug, Default)]
pub struct Dashboard {
    pub checklist: Checklist,
    pub kokoro: CollectibleTracker,
    pub history: History,
    /// Tables from the last import preview, addressed by index on import.
    pub preview: Vec<HtmlTable>,
}

impl Dashboard {
    /// Reads every table once from the backend, falling back to the default
    /// sets.
    pub async fn load(storage: &Storage) -> Self {
        Self {
            checklist: Checklist::new(storage.load(default_tasks()).await),
            kokoro: CollectibleTracker::new(storage.load(default_collectibles()).await),
            history: History::from_entries(storage.load(Vec::new()).await),
            preview: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub fetcher: TableFetcher,
    pub history_enabled: bool,
    pub pacing: PacingDefaults,
    pub data: Arc<Mutex<Dashboard>>,
}

impl AppState {
    pub fn new(config: &Config, storage: Storage, fetcher: TableFetcher, data: Dashboard) -> Self {
        Self {
            storage: Arc::new(storage),
            fetcher,
            history_enabled: config.history_enabled,
            pacing: config.pacing.clone(),
            data: Arc::new(Mutex::new(data)),
        }
    }
}
