//! Task and material management service.

use dashboard_db::materials::{Material, MaterialUpdate};
use dashboard_db::tasks::{Task, TaskUpdate, TaskWithRelations};
use dashboard_db::{Database, DbError};
use serde::{Deserialize, Serialize};

const STATUSES: &[&str] = &["TODO", "IN_PROGRESS", "COMPLETED", "BLOCKED"];
const PRIORITIES: &[&str] = &["LOW", "MEDIUM", "HIGH", "URGENT"];
const DEFAULT_PRIORITY: &str = "MEDIUM";

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Db(DbError),
}

impl TaskError {
    pub fn http_status(&self) -> u16 {
        match self {
            TaskError::Validation(_) => 400,
            TaskError::NotFound(_) => 404,
            TaskError::Db(_) => 500,
        }
    }
}

impl From<DbError> for TaskError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => TaskError::NotFound(what),
            other => TaskError::Db(other),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<String>,
    pub quest_id: Option<String>,
    pub quest_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMaterialInput {
    pub name: String,
    pub quantity: i64,
    pub unit: Option<String>,
    pub item_id: Option<String>,
    pub nbt_data: Option<String>,
}

/// Material completion for one task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialProgress {
    pub obtained: i64,
    pub required: i64,
    pub percentage: i64,
}

#[derive(Clone)]
pub struct TaskService {
    db: Database,
}

impl TaskService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn get_all_tasks(&self) -> Result<Vec<TaskWithRelations>, TaskError> {
        Ok(self.db.get_all_tasks_with_relations()?)
    }

    pub fn create_task(&self, input: &CreateTaskInput) -> Result<Task, TaskError> {
        if input.title.trim().is_empty() {
            return Err(TaskError::Validation("title must not be empty".into()));
        }
        let priority = match &input.priority {
            Some(p) => validate_one_of("priority", p, PRIORITIES)?,
            None => DEFAULT_PRIORITY.to_string(),
        };
        if let Some(assignee) = &input.assigned_to_id {
            if self.db.get_user(assignee)?.is_none() {
                return Err(TaskError::NotFound(format!("user {assignee}")));
            }
        }

        let task = Task {
            id: new_id(),
            title: input.title.clone(),
            description: input.description.clone(),
            status: "TODO".into(),
            priority,
            assigned_to_id: input.assigned_to_id.clone(),
            quest_id: input.quest_id.clone(),
            quest_name: input.quest_name.clone(),
            created_at: None,
            updated_at: None,
        };
        let task = self.db.insert_task(&task)?;
        tracing::info!(id = %task.id, title = %task.title, "Task created");
        Ok(task)
    }

    /// Partial update; only supplied fields are validated and written.
    pub fn update_task(&self, id: &str, update: &TaskUpdate) -> Result<Task, TaskError> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(TaskError::Validation("title must not be empty".into()));
            }
        }
        if let Some(status) = &update.status {
            validate_one_of("status", status, STATUSES)?;
        }
        if let Some(priority) = &update.priority {
            validate_one_of("priority", priority, PRIORITIES)?;
        }
        Ok(self.db.update_task(id, update)?)
    }

    pub fn delete_task(&self, id: &str) -> Result<Task, TaskError> {
        let task = self.db.delete_task(id)?;
        tracing::info!(id = %task.id, "Task deleted");
        Ok(task)
    }

    pub fn add_material(
        &self,
        task_id: &str,
        input: &AddMaterialInput,
    ) -> Result<Material, TaskError> {
        if input.name.trim().is_empty() {
            return Err(TaskError::Validation("name must not be empty".into()));
        }
        if input.quantity <= 0 {
            return Err(TaskError::Validation("quantity must be positive".into()));
        }
        if self.db.get_task(task_id)?.is_none() {
            return Err(TaskError::NotFound(format!("task {task_id}")));
        }

        let material = Material {
            id: new_id(),
            task_id: task_id.into(),
            name: input.name.clone(),
            quantity: input.quantity,
            obtained: 0,
            unit: input.unit.clone(),
            item_id: input.item_id.clone(),
            nbt_data: input.nbt_data.clone(),
            created_at: None,
        };
        Ok(self.db.insert_material(&material)?)
    }

    /// Partial update; only supplied fields are validated and written.
    pub fn update_material(
        &self,
        id: &str,
        update: &MaterialUpdate,
    ) -> Result<Material, TaskError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(TaskError::Validation("name must not be empty".into()));
            }
        }
        if let Some(quantity) = update.quantity {
            if quantity <= 0 {
                return Err(TaskError::Validation("quantity must be positive".into()));
            }
        }
        if let Some(obtained) = update.obtained {
            if obtained < 0 {
                return Err(TaskError::Validation("obtained must not be negative".into()));
            }
        }
        Ok(self.db.update_material(id, update)?)
    }

    pub fn delete_material(&self, id: &str) -> Result<Material, TaskError> {
        Ok(self.db.delete_material(id)?)
    }

    /// Materials for one task, oldest first.
    pub fn get_materials(&self, task_id: &str) -> Result<Vec<Material>, TaskError> {
        Ok(self.db.get_materials_by_task(task_id)?)
    }

    /// Material completion percentage across a task's checklist; a task with
    /// no materials reports 0 rather than dividing by zero.
    pub fn material_progress(&self, task_id: &str) -> Result<MaterialProgress, TaskError> {
        let (obtained, required) = self.db.material_totals(task_id)?;
        let percentage = if required > 0 {
            ((obtained as f64 / required as f64) * 100.0).round() as i64
        } else {
            0
        };
        Ok(MaterialProgress {
            obtained,
            required,
            percentage,
        })
    }
}

fn validate_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<String, TaskError> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(TaskError::Validation(format!(
            "{field} must be one of {allowed:?}"
        )))
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TaskService {
        TaskService::new(Database::open_in_memory().expect("Failed to create test DB"))
    }

    fn create(svc: &TaskService, title: &str) -> Task {
        svc.create_task(&CreateTaskInput {
            title: title.into(),
            description: None,
            priority: None,
            assigned_to_id: None,
            quest_id: None,
            quest_name: None,
        })
        .unwrap()
    }

    #[test]
    fn create_task_defaults() {
        let svc = service();
        let task = create(&svc, "Build LV circuits");
        assert_eq!(task.status, "TODO");
        assert_eq!(task.priority, "MEDIUM");
    }

    #[test]
    fn create_task_rejects_empty_title() {
        let svc = service();
        let err = svc
            .create_task(&CreateTaskInput {
                title: "   ".into(),
                description: None,
                priority: None,
                assigned_to_id: None,
                quest_id: None,
                quest_name: None,
            })
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn create_task_rejects_unknown_assignee() {
        let svc = service();
        let err = svc
            .create_task(&CreateTaskInput {
                title: "Build LV circuits".into(),
                description: None,
                priority: None,
                assigned_to_id: Some("ghost".into()),
                quest_id: None,
                quest_name: None,
            })
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[test]
    fn update_task_validates_enums() {
        let svc = service();
        let task = create(&svc, "Build LV circuits");

        let err = svc
            .update_task(
                &task.id,
                &TaskUpdate {
                    status: Some("DONEISH".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        let updated = svc
            .update_task(
                &task.id,
                &TaskUpdate {
                    status: Some("COMPLETED".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, "COMPLETED");
    }

    #[test]
    fn update_missing_task_is_not_found() {
        let svc = service();
        let err = svc.update_task("nope", &TaskUpdate::default()).unwrap_err();
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn material_validation() {
        let svc = service();
        let task = create(&svc, "Build LV circuits");

        let err = svc
            .add_material(
                &task.id,
                &AddMaterialInput {
                    name: "Iron Ingot".into(),
                    quantity: 0,
                    unit: None,
                    item_id: None,
                    nbt_data: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));

        let material = svc
            .add_material(
                &task.id,
                &AddMaterialInput {
                    name: "Iron Ingot".into(),
                    quantity: 64,
                    unit: None,
                    item_id: Some("minecraft:iron_ingot".into()),
                    nbt_data: None,
                },
            )
            .unwrap();

        let err = svc
            .update_material(
                &material.id,
                &MaterialUpdate {
                    obtained: Some(-1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
    }

    #[test]
    fn add_material_to_missing_task() {
        let svc = service();
        let err = svc
            .add_material(
                "nope",
                &AddMaterialInput {
                    name: "Iron Ingot".into(),
                    quantity: 64,
                    unit: None,
                    item_id: None,
                    nbt_data: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, TaskError::NotFound(_)));
    }

    #[test]
    fn scenario_material_progress_reaches_100() {
        let svc = service();
        let task = create(&svc, "Build LV circuits");
        let material = svc
            .add_material(
                &task.id,
                &AddMaterialInput {
                    name: "Iron Ingot".into(),
                    quantity: 64,
                    unit: None,
                    item_id: None,
                    nbt_data: None,
                },
            )
            .unwrap();

        svc.update_material(
            &material.id,
            &MaterialUpdate {
                obtained: Some(64),
                ..Default::default()
            },
        )
        .unwrap();

        let progress = svc.material_progress(&task.id).unwrap();
        assert_eq!(progress.percentage, 100);
        assert_eq!(progress.obtained, 64);
        assert_eq!(progress.required, 64);
    }

    #[test]
    fn material_progress_without_materials_is_zero() {
        let svc = service();
        let task = create(&svc, "Build LV circuits");
        let progress = svc.material_progress(&task.id).unwrap();
        assert_eq!(progress.percentage, 0);
    }

    #[test]
    fn material_progress_can_exceed_100() {
        let svc = service();
        let task = create(&svc, "Build LV circuits");
        let material = svc
            .add_material(
                &task.id,
                &AddMaterialInput {
                    name: "Iron Ingot".into(),
                    quantity: 64,
                    unit: None,
                    item_id: None,
                    nbt_data: None,
                },
            )
            .unwrap();
        svc.update_material(
            &material.id,
            &MaterialUpdate {
                obtained: Some(128),
                ..Default::default()
            },
        )
        .unwrap();

        let progress = svc.material_progress(&task.id).unwrap();
        assert_eq!(progress.percentage, 200);
    }
}
