//! Quest synchronization service.
//!
//! The Minecraft-side mod pushes quest and quest-line facts opportunistically:
//! the same fact may arrive many times and independent facts may arrive out of
//! order. Every write here is therefore an upsert keyed by the mod-issued
//! natural id, and a retried delivery converges on the same stored state.

use chrono::Utc;
use dashboard_db::quest_lines::QuestLine;
use dashboard_db::quest_progress::{ProgressUpsert, QuestProgress};
use dashboard_db::quests::{Quest, QuestUpsert};
use dashboard_db::{Database, DbError};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Reserved identity used by the mod for events not tied to a player.
const SYSTEM_USER_ID: &str = "system";
const SYSTEM_UUID: &str = "00000000-0000-0000-0000-000000000000";
const SYSTEM_USERNAME: &str = "System";

/// Username given to players first seen through a sync event; the dashboard
/// replaces it once the player registers properly.
const PLACEHOLDER_USERNAME: &str = "Unknown";

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl SyncError {
    pub fn http_status(&self) -> u16 {
        match self {
            SyncError::Db(DbError::NotFound(_)) => 404,
            SyncError::Db(_) => 500,
        }
    }
}

/// A quest fact pushed by the game client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQuestInput {
    pub user_id: String,
    pub quest_id: String,
    pub quest_name: String,
    /// Denormalized quest-line label shown next to the progress row.
    pub quest_line: Option<String>,
    pub completed: bool,
    pub unlocked: Option<bool>,
    pub description: Option<String>,
    pub task_logic: Option<String>,
    pub tasks: Option<Value>,
    pub rewards: Option<Value>,
    pub prerequisites: Option<Vec<String>>,
    /// Natural id of the owning quest line; only honored when the quest is
    /// first created.
    pub quest_line_id: Option<String>,
}

/// A quest-line fact pushed by the game client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncQuestLineInput {
    pub quest_line_id: String,
    pub name: String,
    pub description: Option<String>,
    pub order: Option<i64>,
}

#[derive(Clone)]
pub struct SyncService {
    db: Database,
    events: Option<broadcast::Sender<String>>,
}

impl SyncService {
    pub fn new(db: Database) -> Self {
        Self { db, events: None }
    }

    /// Also announce successful syncs on the dashboard event channel.
    pub fn with_events(db: Database, events: broadcast::Sender<String>) -> Self {
        Self {
            db,
            events: Some(events),
        }
    }

    /// Merge one quest fact into the store.
    ///
    /// Fixed sequence: user, then quest definition, then the player's
    /// progress row — progress has foreign keys into both. There is no
    /// cross-step transaction; a failure in the middle leaves a definition
    /// without its progress row, and the next retry repairs it.
    pub fn sync_quest(
        &self,
        input: &SyncQuestInput,
    ) -> Result<(Quest, QuestProgress), SyncError> {
        self.ensure_user(&input.user_id)?;

        let quest_line_ref = match input.quest_line_id.as_deref() {
            Some(natural_id) => {
                let line = self.db.get_quest_line_by_natural_key(natural_id)?;
                if line.is_none() {
                    tracing::warn!(
                        quest_id = %input.quest_id,
                        quest_line_id = %natural_id,
                        "Quest references a quest line that has not synced yet"
                    );
                }
                line.map(|l| l.id)
            }
            None => None,
        };

        let quest = self.db.upsert_quest(
            &new_id(),
            &QuestUpsert {
                quest_id: input.quest_id.clone(),
                name: input.quest_name.clone(),
                description: input.description.clone(),
                task_logic: input.task_logic.clone().unwrap_or_else(|| "AND".into()),
                tasks: input.tasks.clone(),
                rewards: input.rewards.clone(),
                prerequisites: input.prerequisites.clone().unwrap_or_default(),
                quest_line_id: quest_line_ref,
            },
        )?;

        let completed_at = input.completed.then(|| Utc::now().to_rfc3339());
        let progress = self.db.upsert_progress(
            &new_id(),
            &ProgressUpsert {
                user_id: input.user_id.clone(),
                quest_id: input.quest_id.clone(),
                quest_name: input.quest_name.clone(),
                quest_line: input.quest_line.clone(),
                completed: input.completed,
                unlocked: input.unlocked.unwrap_or(true),
                completed_at,
            },
        )?;

        tracing::info!(
            user_id = %input.user_id,
            quest_id = %input.quest_id,
            completed = input.completed,
            "Quest synced"
        );
        self.broadcast("quest_synced", &serde_json::json!({
            "userId": progress.user_id,
            "questId": progress.quest_id,
            "completed": progress.completed,
        }));

        Ok((quest, progress))
    }

    /// Merge one quest-line fact into the store (full replace of the
    /// definition fields).
    pub fn sync_quest_line(&self, input: &SyncQuestLineInput) -> Result<QuestLine, SyncError> {
        let line = self.db.upsert_quest_line(
            &new_id(),
            &input.quest_line_id,
            &input.name,
            input.description.as_deref(),
            input.order.unwrap_or(0),
        )?;

        tracing::info!(quest_line_id = %input.quest_line_id, "Quest line synced");
        self.broadcast("quest_line_synced", &serde_json::json!({
            "questLineId": line.quest_line_id,
            "name": line.name,
        }));

        Ok(line)
    }

    /// Guarantee the referenced user exists before the progress write. The
    /// reserved "system" identity maps to the zero UUID; any other unknown id
    /// becomes a placeholder record keyed by itself.
    fn ensure_user(&self, user_id: &str) -> Result<(), SyncError> {
        if user_id == SYSTEM_USER_ID {
            self.db
                .ensure_user(SYSTEM_USER_ID, SYSTEM_UUID, SYSTEM_USERNAME)?;
        } else {
            self.db
                .ensure_user(user_id, user_id, PLACEHOLDER_USERNAME)?;
        }
        Ok(())
    }

    fn broadcast(&self, event: &str, data: &Value) {
        if let Some(tx) = &self.events {
            let msg = serde_json::json!({ "type": event, "data": data });
            let _ = tx.send(msg.to_string());
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
