use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

use super::{api, websocket};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        .route("/ws", get(websocket::ws_handler))
        // --- Tasks ---
        .route("/api/tasks", get(api::task::get_tasks).post(api::task::create_task))
        .route("/api/tasks/{id}", put(api::task::update_task).delete(api::task::delete_task))
        .route("/api/tasks/{id}/materials", get(api::material::get_task_materials).post(api::material::add_material))
        .route("/api/tasks/{id}/progress", get(api::material::get_task_progress))
        // --- Materials ---
        .route("/api/materials/{id}", put(api::material::update_material).delete(api::material::delete_material))
        // --- Users ---
        .route("/api/users", get(api::user::get_users).post(api::user::get_or_create_user))
        .route("/api/users/{id}", delete(api::user::delete_user))
        // --- Quests ---
        .route("/api/quests", get(api::quest::get_quests))
        .route("/api/quests/sync", post(api::quest::sync_quest))
        .route("/api/quests/stats/{user_id}", get(api::quest::get_stats))
        .route("/api/quests/progress/{user_id}", get(api::quest::get_user_progress))
        .route("/api/quests/{quest_id}", get(api::quest::get_quest))
        // --- Quest lines ---
        .route("/api/quest-lines", get(api::quest_line::get_quest_lines))
        .route("/api/quest-lines/sync", post(api::quest_line::sync_quest_line))
        .route("/api/quest-lines/progress/{user_id}", get(api::quest_line::get_with_progress))
        .route("/api/quest-lines/{id}", get(api::quest_line::get_quest_line))
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": "1.0.0"
    }))
}
