//! Shared team task storage.

use std::collections::HashMap;

use crate::materials::Material;
use crate::users::User;
use crate::{Database, DbError, OptionalExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub assigned_to_id: Option<String>,
    pub quest_id: Option<String>,
    pub quest_name: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Task joined with its assignee and material checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithRelations {
    #[serde(flatten)]
    pub task: Task,
    pub assigned_to: Option<User>,
    pub materials: Vec<Material>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub status: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, assigned_to_id, \
                            quest_id, quest_name, created_at, updated_at";

fn task_from_row(row: &rusqlite::Row<'_>) -> Result<Task, rusqlite::Error> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        assigned_to_id: row.get(5)?,
        quest_id: row.get(6)?,
        quest_name: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl Database {
    pub fn insert_task(&self, task: &Task) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (id, title, description, status, priority, assigned_to_id, quest_id, quest_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    task.id,
                    task.title,
                    task.description,
                    task.status,
                    task.priority,
                    task.assigned_to_id,
                    task.quest_id,
                    task.quest_name,
                ],
            )?;
            Ok(())
        })?;
        self.get_task(&task.id)?
            .ok_or_else(|| DbError::NotFound(format!("task {}", task.id)))
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"))?;
            let task = stmt.query_row([id], task_from_row).optional()?;
            Ok(task)
        })
    }

    /// All tasks newest first, each with its assignee and materials.
    pub fn get_all_tasks_with_relations(&self) -> Result<Vec<TaskWithRelations>, DbError> {
        let tasks = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, id"
            ))?;
            let rows = stmt.query_map([], task_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })?;

        let mut materials_by_task: HashMap<String, Vec<Material>> = HashMap::new();
        for material in self.get_all_materials()? {
            materials_by_task
                .entry(material.task_id.clone())
                .or_default()
                .push(material);
        }

        let mut users_by_id: HashMap<String, User> = HashMap::new();
        for entry in self.get_all_users_with_counts()? {
            users_by_id.insert(entry.user.id.clone(), entry.user);
        }

        Ok(tasks
            .into_iter()
            .map(|task| {
                let assigned_to = task
                    .assigned_to_id
                    .as_ref()
                    .and_then(|id| users_by_id.get(id).cloned());
                let materials = materials_by_task.remove(&task.id).unwrap_or_default();
                TaskWithRelations {
                    task,
                    assigned_to,
                    materials,
                }
            })
            .collect())
    }

    /// Apply a partial update; only supplied fields are written.
    pub fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, DbError> {
        let changed = self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE tasks SET
                    status = COALESCE(?2, status),
                    title = COALESCE(?3, title),
                    description = COALESCE(?4, description),
                    priority = COALESCE(?5, priority),
                    updated_at = CURRENT_TIMESTAMP
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    update.status,
                    update.title,
                    update.description,
                    update.priority,
                ],
            )?;
            Ok(n)
        })?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("task {id}")));
        }
        self.get_task(id)?
            .ok_or_else(|| DbError::NotFound(format!("task {id}")))
    }

    /// Hard delete; materials go with the task (FK cascade).
    pub fn delete_task(&self, id: &str) -> Result<Task, DbError> {
        let task = self
            .get_task(id)?
            .ok_or_else(|| DbError::NotFound(format!("task {id}")))?;
        self.with_conn(|conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
            Ok(())
        })?;
        Ok(task)
    }
}
