use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::add_task))
        .route("/api/tasks/reset", post(handlers::reset_tasks))
        .route("/api/tasks/:index", delete(handlers::remove_task))
        .route("/api/tasks/:index/toggle", post(handlers::toggle_task))
        .route("/api/pacing", get(handlers::get_pacing))
        .route(
            "/api/kokoro",
            get(handlers::list_kokoro)
                .post(handlers::add_kokoro)
                .put(handlers::edit_kokoro),
        )
        .route(
            "/api/kokoro/:index",
            patch(handlers::update_kokoro).delete(handlers::remove_kokoro),
        )
        .route("/api/history", get(handlers::get_history))
        .route("/api/import/preview", post(handlers::preview_import))
        .route("/api/import", post(handlers::import_table))
        .route("/api/export/:table", get(handlers::export_table))
        .with_state(state)
}
