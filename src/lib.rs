pub mod app;
pub mod checklist;
pub mod collectibles;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod import;
pub mod models;
pub mod pacing;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::{AppState, Dashboard};
pub use storage::Storage;
