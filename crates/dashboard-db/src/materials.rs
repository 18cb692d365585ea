//! Material checklists attached to tasks.
//!
//! `obtained` is deliberately unbounded above: the game happily hands a
//! player more items than a task calls for, and the dashboard renders
//! over-collection as >100%.

use crate::{Database, DbError, OptionalExt};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub task_id: String,
    pub name: String,
    pub quantity: i64,
    pub obtained: i64,
    pub unit: Option<String>,
    pub item_id: Option<String>,
    pub nbt_data: Option<String>,
    pub created_at: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUpdate {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub obtained: Option<i64>,
    pub unit: Option<String>,
    pub item_id: Option<String>,
    pub nbt_data: Option<String>,
}

const MATERIAL_COLUMNS: &str =
    "id, task_id, name, quantity, obtained, unit, item_id, nbt_data, created_at";

fn material_from_row(row: &rusqlite::Row<'_>) -> Result<Material, rusqlite::Error> {
    Ok(Material {
        id: row.get(0)?,
        task_id: row.get(1)?,
        name: row.get(2)?,
        quantity: row.get(3)?,
        obtained: row.get(4)?,
        unit: row.get(5)?,
        item_id: row.get(6)?,
        nbt_data: row.get(7)?,
        created_at: row.get(8)?,
    })
}

impl Database {
    pub fn insert_material(&self, material: &Material) -> Result<Material, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO materials (id, task_id, name, quantity, obtained, unit, item_id, nbt_data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    material.id,
                    material.task_id,
                    material.name,
                    material.quantity,
                    material.obtained,
                    material.unit,
                    material.item_id,
                    material.nbt_data,
                ],
            )?;
            Ok(())
        })?;
        self.get_material(&material.id)?
            .ok_or_else(|| DbError::NotFound(format!("material {}", material.id)))
    }

    pub fn get_material(&self, id: &str) -> Result<Option<Material>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = ?1"
            ))?;
            let material = stmt.query_row([id], material_from_row).optional()?;
            Ok(material)
        })
    }

    /// Materials for one task, oldest first.
    pub fn get_materials_by_task(&self, task_id: &str) -> Result<Vec<Material>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MATERIAL_COLUMNS} FROM materials WHERE task_id = ?1 ORDER BY created_at, id"
            ))?;
            let rows = stmt.query_map([task_id], material_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn get_all_materials(&self) -> Result<Vec<Material>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MATERIAL_COLUMNS} FROM materials ORDER BY created_at, id"
            ))?;
            let rows = stmt.query_map([], material_from_row)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    /// Apply a partial update; only supplied fields are written.
    pub fn update_material(&self, id: &str, update: &MaterialUpdate) -> Result<Material, DbError> {
        let changed = self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE materials SET
                    name = COALESCE(?2, name),
                    quantity = COALESCE(?3, quantity),
                    obtained = COALESCE(?4, obtained),
                    unit = COALESCE(?5, unit),
                    item_id = COALESCE(?6, item_id),
                    nbt_data = COALESCE(?7, nbt_data)
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    update.name,
                    update.quantity,
                    update.obtained,
                    update.unit,
                    update.item_id,
                    update.nbt_data,
                ],
            )?;
            Ok(n)
        })?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("material {id}")));
        }
        self.get_material(id)?
            .ok_or_else(|| DbError::NotFound(format!("material {id}")))
    }

    pub fn delete_material(&self, id: &str) -> Result<Material, DbError> {
        let material = self
            .get_material(id)?
            .ok_or_else(|| DbError::NotFound(format!("material {id}")))?;
        self.with_conn(|conn| {
            conn.execute("DELETE FROM materials WHERE id = ?1", [id])?;
            Ok(())
        })?;
        Ok(material)
    }

    /// `(sum(obtained), sum(quantity))` across one task's materials.
    pub fn material_totals(&self, task_id: &str) -> Result<(i64, i64), DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT COALESCE(SUM(obtained), 0), COALESCE(SUM(quantity), 0)
                 FROM materials WHERE task_id = ?1",
            )?;
            let totals = stmt.query_row([task_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
            Ok(totals)
        })
    }
}
