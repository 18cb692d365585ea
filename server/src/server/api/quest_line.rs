//! Quest line synchronization and progress API.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::app::SharedState;
use crate::services::stats::StatsService;
use crate::services::sync::{SyncQuestLineInput, SyncService};

use super::{err_json, ApiResult};

/// POST /api/quest-lines/sync
pub async fn sync_quest_line(
    State(state): State<SharedState>,
    Json(input): Json<SyncQuestLineInput>,
) -> ApiResult {
    let svc = if state.config().await.sync_broadcast {
        SyncService::with_events(state.db().clone(), state.ws_sender().clone())
    } else {
        SyncService::new(state.db().clone())
    };
    let line = svc
        .sync_quest_line(&input)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "questLine": line })))
}

/// GET /api/quest-lines/progress/:user_id
pub async fn get_with_progress(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> ApiResult {
    let svc = StatsService::new(state.db().clone());
    let lines = svc
        .get_quest_lines_with_progress(&user_id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "questLines": lines, "count": lines.len() })))
}

/// GET /api/quest-lines
pub async fn get_quest_lines(State(state): State<SharedState>) -> ApiResult {
    let svc = StatsService::new(state.db().clone());
    let lines = svc
        .get_all_quest_lines()
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "questLines": lines, "count": lines.len() })))
}

/// GET /api/quest-lines/:id
pub async fn get_quest_line(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let svc = StatsService::new(state.db().clone());
    let line = svc
        .get_quest_line(&id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?
        .ok_or_else(|| err_json(404, &format!("quest line {id} not found")))?;
    Ok(Json(json!(line)))
}
