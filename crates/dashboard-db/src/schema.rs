//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    setting_type TEXT NOT NULL DEFAULT 'normal',
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    minecraft_uuid TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT,
    status TEXT NOT NULL DEFAULT 'TODO'
        CHECK(status IN ('TODO', 'IN_PROGRESS', 'COMPLETED', 'BLOCKED')),
    priority TEXT NOT NULL DEFAULT 'MEDIUM'
        CHECK(priority IN ('LOW', 'MEDIUM', 'HIGH', 'URGENT')),
    assigned_to_id TEXT REFERENCES users(id) ON DELETE SET NULL,
    quest_id TEXT,
    quest_name TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_tasks_assigned_to_id
    ON tasks(assigned_to_id);

CREATE TABLE IF NOT EXISTS materials (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    quantity INTEGER NOT NULL,
    obtained INTEGER NOT NULL DEFAULT 0,
    unit TEXT,
    item_id TEXT,
    nbt_data TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_materials_task_id
    ON materials(task_id);

CREATE TABLE IF NOT EXISTS quest_lines (
    id TEXT PRIMARY KEY,
    quest_line_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    display_order INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS quests (
    id TEXT PRIMARY KEY,
    quest_id TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    description TEXT,
    task_logic TEXT NOT NULL DEFAULT 'AND',
    tasks_json TEXT,
    rewards_json TEXT,
    prerequisites_json TEXT NOT NULL DEFAULT '[]',
    quest_line_id TEXT REFERENCES quest_lines(id) ON DELETE SET NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_quests_quest_line_id
    ON quests(quest_line_id);

CREATE TABLE IF NOT EXISTS quest_progress (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    quest_id TEXT NOT NULL,
    quest_name TEXT NOT NULL,
    quest_line TEXT,
    completed BOOLEAN NOT NULL DEFAULT false,
    unlocked BOOLEAN NOT NULL DEFAULT true,
    completed_at TIMESTAMP,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(user_id, quest_id)
);

CREATE INDEX IF NOT EXISTS idx_quest_progress_user_id
    ON quest_progress(user_id);

CREATE INDEX IF NOT EXISTS idx_quest_progress_quest_id
    ON quest_progress(quest_id);
"#;
