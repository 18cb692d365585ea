//! Quest line definitions synchronized from the game.

use std::collections::HashMap;

use crate::quest_progress::QuestProgress;
use crate::quests::Quest;
use crate::{Database, DbError, OptionalExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLine {
    pub id: String,
    pub quest_line_id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "order")]
    pub display_order: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Quest with the progress rows the caller asked for (all rows, or one
/// user's row only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestWithProgress {
    #[serde(flatten)]
    pub quest: Quest,
    pub progress: Vec<QuestProgress>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestLineWithQuests {
    #[serde(flatten)]
    pub quest_line: QuestLine,
    pub quests: Vec<QuestWithProgress>,
}

const LINE_COLUMNS: &str =
    "id, quest_line_id, name, description, display_order, created_at, updated_at";

fn line_from_row(row: &rusqlite::Row<'_>) -> Result<QuestLine, rusqlite::Error> {
    Ok(QuestLine {
        id: row.get(0)?,
        quest_line_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        display_order: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Database {
    /// Upsert by natural key. An existing row keeps its internal id and gets
    /// name/description/order fully replaced; `new_id` is only used when the
    /// line does not exist yet.
    pub fn upsert_quest_line(
        &self,
        new_id: &str,
        quest_line_id: &str,
        name: &str,
        description: Option<&str>,
        display_order: i64,
    ) -> Result<QuestLine, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO quest_lines (id, quest_line_id, name, description, display_order)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(quest_line_id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    display_order = excluded.display_order,
                    updated_at = CURRENT_TIMESTAMP",
                rusqlite::params![new_id, quest_line_id, name, description, display_order],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {LINE_COLUMNS} FROM quest_lines WHERE quest_line_id = ?1"
            ))?;
            let line = stmt.query_row([quest_line_id], line_from_row)?;
            Ok(line)
        })
    }

    pub fn get_quest_line_by_natural_key(
        &self,
        quest_line_id: &str,
    ) -> Result<Option<QuestLine>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LINE_COLUMNS} FROM quest_lines WHERE quest_line_id = ?1"
            ))?;
            let line = stmt.query_row([quest_line_id], line_from_row).optional()?;
            Ok(line)
        })
    }

    pub fn get_quest_line(&self, id: &str) -> Result<Option<QuestLine>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LINE_COLUMNS} FROM quest_lines WHERE id = ?1"
            ))?;
            let line = stmt.query_row([id], line_from_row).optional()?;
            Ok(line)
        })
    }

    /// All quest lines ordered by display order.
    pub fn get_all_quest_lines(&self) -> Result<Vec<QuestLine>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LINE_COLUMNS} FROM quest_lines ORDER BY display_order, quest_line_id"
            ))?;
            let rows = stmt.query_map([], line_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn count_quest_lines(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT COUNT(*) FROM quest_lines")?;
            let n = stmt.query_row([], |row| row.get(0))?;
            Ok(n)
        })
    }

    /// Every quest line with its quests; each quest carries only `user_id`'s
    /// progress row when a user is given, otherwise all progress rows.
    pub fn get_quest_lines_with_progress(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<QuestLineWithQuests>, DbError> {
        let lines = self.get_all_quest_lines()?;

        let mut quests_by_line: HashMap<String, Vec<Quest>> = HashMap::new();
        for quest in self.get_all_quests()? {
            if let Some(line_id) = quest.quest_line_id.clone() {
                quests_by_line.entry(line_id).or_default().push(quest);
            }
        }

        let progress_rows = match user_id {
            Some(uid) => self.get_user_progress(uid)?,
            None => self.get_all_progress()?,
        };
        let mut progress_by_quest: HashMap<String, Vec<QuestProgress>> = HashMap::new();
        for row in progress_rows {
            progress_by_quest
                .entry(row.quest_id.clone())
                .or_default()
                .push(row);
        }

        Ok(lines
            .into_iter()
            .map(|line| {
                let quests = quests_by_line
                    .remove(&line.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|quest| {
                        let progress = progress_by_quest
                            .get(&quest.quest_id)
                            .cloned()
                            .unwrap_or_default();
                        QuestWithProgress { quest, progress }
                    })
                    .collect();
                QuestLineWithQuests {
                    quest_line: line,
                    quests,
                }
            })
            .collect())
    }
}
