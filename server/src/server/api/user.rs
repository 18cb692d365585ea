//! Team member API.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::app::SharedState;

use super::{err_json, ApiResult};

#[derive(Debug, Deserialize)]
pub struct GetOrCreateUserRequest {
    #[serde(rename = "minecraftUUID")]
    pub minecraft_uuid: String,
    pub username: String,
}

/// GET /api/users
pub async fn get_users(State(state): State<SharedState>) -> ApiResult {
    let users = state
        .db()
        .get_all_users_with_counts()
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(json!({ "users": users, "count": users.len() })))
}

/// POST /api/users
pub async fn get_or_create_user(
    State(state): State<SharedState>,
    Json(body): Json<GetOrCreateUserRequest>,
) -> ApiResult {
    if body.minecraft_uuid.trim().is_empty() {
        return Err(err_json(400, "minecraftUUID is required"));
    }
    if body.username.trim().is_empty() {
        return Err(err_json(400, "username is required"));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let user = state
        .db()
        .upsert_user(&id, &body.minecraft_uuid, &body.username)
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(json!({ "status": "ok", "user": user })))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult {
    let user = state.db().delete_user(&id).map_err(|e| match e {
        dashboard_db::DbError::NotFound(_) => err_json(404, &e.to_string()),
        _ => err_json(500, &e.to_string()),
    })?;
    Ok(Json(json!({ "status": "ok", "user": user })))
}
