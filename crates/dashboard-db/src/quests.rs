//! Quest definitions synchronized from the game.
//!
//! Definitions are global and shared by every player; per-player state lives
//! in `quest_progress`. The game pushes the same quest many times, so writes
//! are upserts keyed by the mod-issued `quest_id`, never plain inserts.

use crate::{Database, DbError, OptionalExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub quest_id: String,
    pub name: String,
    pub description: Option<String>,
    pub task_logic: String,
    pub tasks: Option<Value>,
    pub rewards: Option<Value>,
    pub prerequisites: Vec<String>,
    pub quest_line_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Fields written by a quest upsert.
#[derive(Debug, Clone)]
pub struct QuestUpsert {
    pub quest_id: String,
    pub name: String,
    pub description: Option<String>,
    pub task_logic: String,
    pub tasks: Option<Value>,
    pub rewards: Option<Value>,
    pub prerequisites: Vec<String>,
    /// Only applied on creation; an update never moves a quest between lines.
    pub quest_line_id: Option<String>,
}

const QUEST_COLUMNS: &str = "id, quest_id, name, description, task_logic, tasks_json, \
                             rewards_json, prerequisites_json, quest_line_id, created_at, updated_at";

fn quest_from_row(row: &rusqlite::Row<'_>) -> Result<Quest, rusqlite::Error> {
    Ok(Quest {
        id: row.get(0)?,
        quest_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        task_logic: row.get(4)?,
        tasks: parse_json_column(row.get::<_, Option<String>>(5)?),
        rewards: parse_json_column(row.get::<_, Option<String>>(6)?),
        prerequisites: parse_string_list(row.get::<_, Option<String>>(7)?),
        quest_line_id: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn parse_json_column(raw: Option<String>) -> Option<Value> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&raw).ok()
}

fn parse_string_list(raw: Option<String>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let parsed = serde_json::from_str::<Value>(&raw).unwrap_or(Value::Array(vec![]));
    let Some(items) = parsed.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|value| value.as_str().map(ToOwned::to_owned))
        .collect()
}

impl Database {
    /// Upsert by natural key. On update the definition fields are fully
    /// replaced but `quest_line_id` is left alone; `new_id` is only used when
    /// the quest does not exist yet.
    pub fn upsert_quest(&self, new_id: &str, upsert: &QuestUpsert) -> Result<Quest, DbError> {
        let tasks_json = upsert.tasks.as_ref().map(Value::to_string);
        let rewards_json = upsert.rewards.as_ref().map(Value::to_string);
        let prerequisites_json = serde_json::to_string(&upsert.prerequisites)
            .map_err(|e| DbError::InvalidData(e.to_string()))?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO quests (id, quest_id, name, description, task_logic,
                                     tasks_json, rewards_json, prerequisites_json, quest_line_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(quest_id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    task_logic = excluded.task_logic,
                    tasks_json = excluded.tasks_json,
                    rewards_json = excluded.rewards_json,
                    prerequisites_json = excluded.prerequisites_json,
                    updated_at = CURRENT_TIMESTAMP",
                rusqlite::params![
                    new_id,
                    upsert.quest_id,
                    upsert.name,
                    upsert.description,
                    upsert.task_logic,
                    tasks_json,
                    rewards_json,
                    prerequisites_json,
                    upsert.quest_line_id,
                ],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUEST_COLUMNS} FROM quests WHERE quest_id = ?1"
            ))?;
            let quest = stmt.query_row([upsert.quest_id.as_str()], quest_from_row)?;
            Ok(quest)
        })
    }

    pub fn get_quest_by_quest_id(&self, quest_id: &str) -> Result<Option<Quest>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUEST_COLUMNS} FROM quests WHERE quest_id = ?1"
            ))?;
            let quest = stmt.query_row([quest_id], quest_from_row).optional()?;
            Ok(quest)
        })
    }

    pub fn get_all_quests(&self) -> Result<Vec<Quest>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {QUEST_COLUMNS} FROM quests ORDER BY quest_id"))?;
            let rows = stmt.query_map([], quest_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    /// Quests belonging to a quest line (by the line's internal id).
    pub fn get_quests_by_line(&self, quest_line_id: &str) -> Result<Vec<Quest>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {QUEST_COLUMNS} FROM quests WHERE quest_line_id = ?1 ORDER BY quest_id"
            ))?;
            let rows = stmt.query_map([quest_line_id], quest_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn count_quests(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT COUNT(*) FROM quests")?;
            let n = stmt.query_row([], |row| row.get(0))?;
            Ok(n)
        })
    }
}
