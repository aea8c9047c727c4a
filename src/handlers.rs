use crate::collectibles::CollectibleTracker;
use crate::errors::{AppError, DomainError};
use crate::import::HtmlTable;
use crate::models::{
    Collectible, CollectiblePatch, CollectibleRow, GridEditResponse, HistoryEntry, HistoryQuery,
    HistoryResponse, ImportRequest, ImportResponse, NewCollectibleRequest, NewTaskRequest,
    PacingQuery, PacingResponse, PreviewRequest, Task,
};
use crate::pacing::{self, PacingInput};
use crate::state::AppState;
use crate::storage::{self, TableRecord};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

const DEFAULT_RECENT: usize = 10;

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let pacing = pacing_response(&state, None, None, None)?;
    let data = state.data.lock().await;
    Ok(Html(render_index(&data, &pacing)))
}

pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    let data = state.data.lock().await;
    Json(data.checklist.tasks().to_vec())
}

pub async fn add_task(
    State(state): State<AppState>,
    Json(payload): Json<NewTaskRequest>,
) -> Result<(StatusCode, Json<Vec<Task>>), AppError> {
    let mut data = state.data.lock().await;
    data.checklist.add(&payload.name)?;
    state.storage.save(data.checklist.tasks()).await?;
    Ok((StatusCode::CREATED, Json(data.checklist.tasks().to_vec())))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Vec<Task>>, AppError> {
    let mut guard = state.data.lock().await;
    let data = &mut *guard;
    let history = state.history_enabled.then_some(&mut data.history);
    data.checklist.toggle(index, today(), history)?;

    state.storage.save(data.checklist.tasks()).await?;
    if state.history_enabled {
        state.storage.save(data.history.entries()).await?;
    }
    Ok(Json(data.checklist.tasks().to_vec()))
}

pub async fn remove_task(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Vec<Task>>, AppError> {
    let mut data = state.data.lock().await;
    let removed = data.checklist.remove(index)?;
    info!(task = %removed.name, "removed task");
    state.storage.save(data.checklist.tasks()).await?;
    Ok(Json(data.checklist.tasks().to_vec()))
}

pub async fn reset_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>, AppError> {
    let mut data = state.data.lock().await;
    data.checklist.reset();
    state.storage.save(data.checklist.tasks()).await?;
    Ok(Json(data.checklist.tasks().to_vec()))
}

pub async fn get_pacing(
    State(state): State<AppState>,
    Query(query): Query<PacingQuery>,
) -> Result<Json<PacingResponse>, AppError> {
    let response = pacing_response(&state, query.current, query.target, query.target_date)?;
    Ok(Json(response))
}

pub async fn list_kokoro(State(state): State<AppState>) -> Json<Vec<Collectible>> {
    let data = state.data.lock().await;
    Json(data.kokoro.rows().to_vec())
}

pub async fn add_kokoro(
    State(state): State<AppState>,
    Json(payload): Json<NewCollectibleRequest>,
) -> Result<(StatusCode, Json<Vec<Collectible>>), AppError> {
    let mut data = state.data.lock().await;
    data.kokoro.add(Collectible::new(
        payload.name,
        payload.priority,
        payload.target_count,
        payload.held_count,
    ))?;
    state.storage.save(data.kokoro.rows()).await?;
    Ok((StatusCode::CREATED, Json(data.kokoro.rows().to_vec())))
}

/// Whole-grid edit. Nothing is written when the submitted grid matches the
/// current rows; otherwise the table is saved and read back.
pub async fn edit_kokoro(
    State(state): State<AppState>,
    Json(rows): Json<Vec<CollectibleRow>>,
) -> Result<Json<GridEditResponse>, AppError> {
    let mut data = state.data.lock().await;
    let changed = data.kokoro.apply_edit(rows)?;
    if changed {
        state.storage.save(data.kokoro.rows()).await?;
        let stored = state.storage.load(data.kokoro.rows().to_vec()).await;
        data.kokoro = CollectibleTracker::new(stored);
        info!(rows = data.kokoro.rows().len(), "saved kokoro grid");
    }
    Ok(Json(GridEditResponse {
        changed,
        rows: data.kokoro.rows().to_vec(),
    }))
}

pub async fn update_kokoro(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(patch): Json<CollectiblePatch>,
) -> Result<Json<Collectible>, AppError> {
    let mut data = state.data.lock().await;
    let updated = data.kokoro.update(index, patch)?.clone();
    state.storage.save(data.kokoro.rows()).await?;
    Ok(Json(updated))
}

pub async fn remove_kokoro(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Vec<Collectible>>, AppError> {
    let mut data = state.data.lock().await;
    let removed = data.kokoro.remove(index)?;
    info!(kokoro = %removed.name, "removed kokoro");
    state.storage.save(data.kokoro.rows()).await?;
    Ok(Json(data.kokoro.rows().to_vec()))
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let data = state.data.lock().await;
    Json(HistoryResponse {
        daily: data.history.daily_done_counts(),
        recent: data.history.recent_done(query.recent.unwrap_or(DEFAULT_RECENT)),
    })
}

pub async fn preview_import(
    State(state): State<AppState>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<Vec<HtmlTable>>, AppError> {
    let url = payload.url.trim();
    if url.is_empty() {
        return Err(AppError::bad_request("url must not be empty"));
    }

    let tables = state.fetcher.fetch_tables(url).await;
    if tables.is_empty() {
        warn!(url, "no tables found for import");
    }

    let mut data = state.data.lock().await;
    data.preview = tables.clone();
    Ok(Json(tables))
}

pub async fn import_table(
    State(state): State<AppState>,
    Json(payload): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    let mut data = state.data.lock().await;
    let Some(table) = data.preview.get(payload.table_index) else {
        warn!(index = payload.table_index, "import requested for a missing table");
        return Err(AppError::bad_request(format!(
            "no previewed table at index {}",
            payload.table_index
        )));
    };

    let names = table.first_column();
    let added = data.kokoro.bulk_import(names);
    if added > 0 {
        state.storage.save(data.kokoro.rows()).await?;
    }
    info!(added, "imported kokoro names");

    Ok(Json(ImportResponse {
        added,
        rows: data.kokoro.rows().to_vec(),
    }))
}

pub async fn export_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let name = table.trim_end_matches(".csv");
    let data = state.data.lock().await;
    let rendered = if name == Task::TABLE {
        storage::to_csv(data.checklist.tasks())
    } else if name == Collectible::TABLE {
        storage::to_csv(data.kokoro.rows())
    } else if name == HistoryEntry::TABLE {
        storage::to_csv(data.history.entries())
    } else {
        return Err(DomainError::UnknownTable(name.to_string()).into());
    };
    let csv = rendered.map_err(AppError::internal)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}.csv\""),
            ),
        ],
        csv,
    ))
}

fn pacing_response(
    state: &AppState,
    current: Option<i64>,
    target: Option<i64>,
    target_date: Option<NaiveDate>,
) -> Result<PacingResponse, DomainError> {
    let input = PacingInput::new(
        current.unwrap_or(state.pacing.current),
        target.unwrap_or(state.pacing.target),
        target_date.unwrap_or(state.pacing.target_date),
    )?;
    let outcome = pacing::calculate_at(today(), input);
    Ok(PacingResponse {
        current: input.current,
        target: input.target,
        target_date: input.target_date,
        message: outcome.message(),
        outcome,
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
