//! Per-player quest completion state.
//!
//! Exactly one row per (user, quest) pair, enforced by a composite unique
//! constraint; re-delivery from the game updates in place.

use crate::{Database, DbError, OptionalExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    pub id: String,
    pub user_id: String,
    pub quest_id: String,
    pub quest_name: String,
    pub quest_line: Option<String>,
    pub completed: bool,
    pub unlocked: bool,
    pub completed_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Fields written by a progress upsert.
#[derive(Debug, Clone)]
pub struct ProgressUpsert {
    pub user_id: String,
    pub quest_id: String,
    pub quest_name: String,
    pub quest_line: Option<String>,
    pub completed: bool,
    pub unlocked: bool,
    /// Set when `completed`, cleared (NULL) otherwise — including on a
    /// completed → not-completed transition.
    pub completed_at: Option<String>,
}

const PROGRESS_COLUMNS: &str = "id, user_id, quest_id, quest_name, quest_line, completed, \
                                unlocked, completed_at, created_at, updated_at";

fn progress_from_row(row: &rusqlite::Row<'_>) -> Result<QuestProgress, rusqlite::Error> {
    Ok(QuestProgress {
        id: row.get(0)?,
        user_id: row.get(1)?,
        quest_id: row.get(2)?,
        quest_name: row.get(3)?,
        quest_line: row.get(4)?,
        completed: row.get(5)?,
        unlocked: row.get(6)?,
        completed_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl Database {
    /// Upsert by the (user, quest) composite key; `new_id` is only used when
    /// the pair has never been seen.
    pub fn upsert_progress(
        &self,
        new_id: &str,
        upsert: &ProgressUpsert,
    ) -> Result<QuestProgress, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO quest_progress (id, user_id, quest_id, quest_name, quest_line,
                                             completed, unlocked, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(user_id, quest_id) DO UPDATE SET
                    quest_name = excluded.quest_name,
                    quest_line = excluded.quest_line,
                    completed = excluded.completed,
                    unlocked = excluded.unlocked,
                    completed_at = excluded.completed_at,
                    updated_at = CURRENT_TIMESTAMP",
                rusqlite::params![
                    new_id,
                    upsert.user_id,
                    upsert.quest_id,
                    upsert.quest_name,
                    upsert.quest_line,
                    upsert.completed,
                    upsert.unlocked,
                    upsert.completed_at,
                ],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM quest_progress WHERE user_id = ?1 AND quest_id = ?2"
            ))?;
            let progress = stmt.query_row(
                [upsert.user_id.as_str(), upsert.quest_id.as_str()],
                progress_from_row,
            )?;
            Ok(progress)
        })
    }

    pub fn get_progress(
        &self,
        user_id: &str,
        quest_id: &str,
    ) -> Result<Option<QuestProgress>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM quest_progress WHERE user_id = ?1 AND quest_id = ?2"
            ))?;
            let progress = stmt
                .query_row([user_id, quest_id], progress_from_row)
                .optional()?;
            Ok(progress)
        })
    }

    /// All progress rows for one user.
    pub fn get_user_progress(&self, user_id: &str) -> Result<Vec<QuestProgress>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM quest_progress WHERE user_id = ?1 ORDER BY quest_id"
            ))?;
            let rows = stmt.query_map([user_id], progress_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    /// All players' rows for one quest.
    pub fn get_progress_by_quest(&self, quest_id: &str) -> Result<Vec<QuestProgress>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM quest_progress WHERE quest_id = ?1 ORDER BY user_id"
            ))?;
            let rows = stmt.query_map([quest_id], progress_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn get_all_progress(&self) -> Result<Vec<QuestProgress>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROGRESS_COLUMNS} FROM quest_progress ORDER BY user_id, quest_id"
            ))?;
            let rows = stmt.query_map([], progress_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn count_progress_rows(&self, user_id: &str, quest_id: &str) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*) FROM quest_progress WHERE user_id = ?1 AND quest_id = ?2",
            )?;
            let n = stmt.query_row([user_id, quest_id], |row| row.get(0))?;
            Ok(n)
        })
    }

    pub fn count_completed(&self, user_id: &str) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*) FROM quest_progress WHERE user_id = ?1 AND completed",
            )?;
            let n = stmt.query_row([user_id], |row| row.get(0))?;
            Ok(n)
        })
    }

    /// Unlocked-but-not-completed count for one user.
    pub fn count_unlocked_incomplete(&self, user_id: &str) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*) FROM quest_progress
                 WHERE user_id = ?1 AND unlocked AND NOT completed",
            )?;
            let n = stmt.query_row([user_id], |row| row.get(0))?;
            Ok(n)
        })
    }
}
