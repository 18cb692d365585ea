//! Team member storage.
//!
//! Users come from two places: explicit registration through the dashboard
//! (keyed by Minecraft UUID) and implicit creation when a quest sync event
//! references an id the store has never seen.

use crate::{Database, DbError, OptionalExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(rename = "minecraftUUID")]
    pub minecraft_uuid: String,
    pub username: String,
    pub created_at: Option<String>,
}

/// User plus how many tasks are assigned to them and how many quest
/// progress rows they own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithCounts {
    #[serde(flatten)]
    pub user: User,
    pub task_count: i64,
    pub progress_count: i64,
}

const USER_COLUMNS: &str = "id, minecraft_uuid, username, created_at";

fn user_from_row(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        minecraft_uuid: row.get(1)?,
        username: row.get(2)?,
        created_at: row.get(3)?,
    })
}

impl Database {
    /// Upsert a user by Minecraft UUID. An existing user keeps their id and
    /// gets the supplied username; a new user is created with `id`.
    pub fn upsert_user(
        &self,
        id: &str,
        minecraft_uuid: &str,
        username: &str,
    ) -> Result<User, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, minecraft_uuid, username) VALUES (?1, ?2, ?3)
                 ON CONFLICT(minecraft_uuid) DO UPDATE SET
                    username = excluded.username",
                rusqlite::params![id, minecraft_uuid, username],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE minecraft_uuid = ?1"
            ))?;
            let user = stmt.query_row([minecraft_uuid], user_from_row)?;
            Ok(user)
        })
    }

    /// Conditionally insert a user by primary id. Does nothing if the id (or
    /// the Minecraft UUID) already exists; single statement, so there is no
    /// check-then-insert race.
    pub fn ensure_user(
        &self,
        id: &str,
        minecraft_uuid: &str,
        username: &str,
    ) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, minecraft_uuid, username) VALUES (?1, ?2, ?3)
                 ON CONFLICT DO NOTHING",
                rusqlite::params![id, minecraft_uuid, username],
            )?;
            if inserted == 1 {
                tracing::info!(id = %id, "User created on first sync reference");
            }
            Ok(())
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let user = stmt.query_row([id], user_from_row).optional()?;
            Ok(user)
        })
    }

    /// All users with their assigned-task and quest-progress counts.
    pub fn get_all_users_with_counts(&self) -> Result<Vec<UserWithCounts>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.minecraft_uuid, u.username, u.created_at,
                        (SELECT COUNT(*) FROM tasks t WHERE t.assigned_to_id = u.id),
                        (SELECT COUNT(*) FROM quest_progress p WHERE p.user_id = u.id)
                 FROM users u
                 ORDER BY u.created_at",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(UserWithCounts {
                    user: user_from_row(row)?,
                    task_count: row.get(4)?,
                    progress_count: row.get(5)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    /// Delete a user and return the deleted record. Assigned tasks survive
    /// with a cleared assignee; the user's progress rows go with them.
    pub fn delete_user(&self, id: &str) -> Result<User, DbError> {
        let user = self
            .get_user(id)?
            .ok_or_else(|| DbError::NotFound(format!("user {id}")))?;
        self.with_conn(|conn| {
            conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(())
        })?;
        Ok(user)
    }
}
