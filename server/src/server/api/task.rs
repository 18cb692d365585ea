//! Task CRUD API.

use axum::extract::{Path, State};
use axum::Json;
use dashboard_db::tasks::TaskUpdate;
use serde_json::json;

use crate::app::SharedState;
use crate::services::tasks::{CreateTaskInput, TaskService};

use super::{err_json, ApiResult};

/// GET /api/tasks
pub async fn get_tasks(State(state): State<SharedState>) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let tasks = svc
        .get_all_tasks()
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "tasks": tasks, "count": tasks.len() })))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<SharedState>,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let task = svc
        .create_task(&input)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "task": task })))
}

/// PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let task = svc
        .update_task(&id, &update)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "task": task })))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let task = svc
        .delete_task(&id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "task": task })))
}
