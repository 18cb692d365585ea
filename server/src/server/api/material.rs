//! Material checklist API.

use axum::extract::{Path, State};
use axum::Json;
use dashboard_db::materials::MaterialUpdate;
use serde_json::json;

use crate::app::SharedState;
use crate::services::tasks::{AddMaterialInput, TaskService};

use super::{err_json, ApiResult};

/// POST /api/tasks/:id/materials
pub async fn add_material(
    State(state): State<SharedState>,
    Path(task_id): Path<String>,
    Json(input): Json<AddMaterialInput>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let material = svc
        .add_material(&task_id, &input)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "material": material })))
}

/// GET /api/tasks/:id/materials
pub async fn get_task_materials(
    State(state): State<SharedState>,
    Path(task_id): Path<String>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let materials = svc
        .get_materials(&task_id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "materials": materials, "count": materials.len() })))
}

/// GET /api/tasks/:id/progress
pub async fn get_task_progress(
    State(state): State<SharedState>,
    Path(task_id): Path<String>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let progress = svc
        .material_progress(&task_id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!(progress)))
}

/// PUT /api/materials/:id
pub async fn update_material(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(update): Json<MaterialUpdate>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let material = svc
        .update_material(&id, &update)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "material": material })))
}

/// DELETE /api/materials/:id
pub async fn delete_material(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let svc = TaskService::new(state.db().clone());
    let material = svc
        .delete_material(&id)
        .map_err(|e| err_json(e.http_status(), &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "material": material })))
}
