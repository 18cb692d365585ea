//! Quest synchronization and statistics API.
//!
//! `POST /api/quests/sync` is the endpoint the Minecraft-side mod calls; the
//! rest serve the dashboard pages.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use crate::app::SharedState;
use crate::services::stats::StatsService;
use crate::services::sync::{SyncQuestInput, SyncService};

use super::{err_json, ApiResult};

/// POST /api/quests/sync
pub async fn sync_quest(
    State(state): State<SharedState>,
    Json(input): Json<SyncQuestInput>,
) -> ApiResult {
    let svc = if state.config().await.sync_broadcast {
        SyncService::with_events(state.db().clone(), state.ws_sender().clone())
    } else {
        SyncService::new(state.db().clone())
    };
    let (quest, progress) = svc
        .sync_quest(&input)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "quest": quest, "progress": progress })))
}

/// GET /api/quests/stats/:user_id
pub async fn get_stats(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> ApiResult {
    let svc = StatsService::new(state.db().clone());
    let stats = svc
        .get_stats(&user_id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!(stats)))
}

/// GET /api/quests
pub async fn get_quests(State(state): State<SharedState>) -> ApiResult {
    let svc = StatsService::new(state.db().clone());
    let quests = svc
        .get_all_quests()
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "quests": quests, "count": quests.len() })))
}

/// GET /api/quests/:quest_id
pub async fn get_quest(
    State(state): State<SharedState>,
    Path(quest_id): Path<String>,
) -> ApiResult {
    let svc = StatsService::new(state.db().clone());
    let quest = svc
        .get_quest(&quest_id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!(quest)))
}

/// GET /api/quests/progress/:user_id
pub async fn get_user_progress(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> ApiResult {
    let svc = StatsService::new(state.db().clone());
    let progress = svc
        .get_user_progress(&user_id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "progress": progress, "count": progress.len() })))
}
