//! Derived views over quest data: per-user stats and the quest-line tree.

use dashboard_db::quest_lines::{QuestLineWithQuests, QuestWithProgress};
use dashboard_db::quest_progress::QuestProgress;
use dashboard_db::{Database, DbError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Quest not found: {0}")]
    QuestNotFound(String),
}

impl StatsError {
    pub fn http_status(&self) -> u16 {
        match self {
            StatsError::Db(DbError::NotFound(_)) | StatsError::QuestNotFound(_) => 404,
            StatsError::Db(_) => 500,
        }
    }
}

/// Per-user quest completion statistics.
///
/// `locked` is plain arithmetic over the other counts and is intentionally
/// not clamped: inconsistent progress data (more completions than quests)
/// shows up as a negative number instead of being hidden.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestStats {
    pub total: i64,
    pub completed: i64,
    pub unlocked: i64,
    pub locked: i64,
    pub percentage: i64,
}

#[derive(Clone)]
pub struct StatsService {
    db: Database,
}

impl StatsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Completion statistics for one user against the global quest set.
    pub fn get_stats(&self, user_id: &str) -> Result<QuestStats, StatsError> {
        let total = self.db.count_quests()?;
        let completed = self.db.count_completed(user_id)?;
        let unlocked = self.db.count_unlocked_incomplete(user_id)?;

        let percentage = if total > 0 {
            ((completed as f64 / total as f64) * 100.0).round() as i64
        } else {
            0
        };

        Ok(QuestStats {
            total,
            completed,
            unlocked,
            locked: total - completed - unlocked,
            percentage,
        })
    }

    /// Every quest line (display order) with its quests, each carrying only
    /// the given user's progress row.
    pub fn get_quest_lines_with_progress(
        &self,
        user_id: &str,
    ) -> Result<Vec<QuestLineWithQuests>, StatsError> {
        Ok(self.db.get_quest_lines_with_progress(Some(user_id))?)
    }

    /// The full quest-line tree with every player's progress rows.
    pub fn get_all_quest_lines(&self) -> Result<Vec<QuestLineWithQuests>, StatsError> {
        Ok(self.db.get_quest_lines_with_progress(None)?)
    }

    pub fn get_quest_line(&self, id: &str) -> Result<Option<QuestLineWithQuests>, StatsError> {
        let Some(line) = self.db.get_quest_line(id)? else {
            return Ok(None);
        };
        let quests = self
            .db
            .get_quests_by_line(&line.id)?
            .into_iter()
            .map(|quest| {
                let progress = self.db.get_progress_by_quest(&quest.quest_id)?;
                Ok(QuestWithProgress { quest, progress })
            })
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(Some(QuestLineWithQuests {
            quest_line: line,
            quests,
        }))
    }

    /// All quest definitions with every player's progress rows.
    pub fn get_all_quests(&self) -> Result<Vec<QuestWithProgress>, StatsError> {
        let quests = self.db.get_all_quests()?;
        quests
            .into_iter()
            .map(|quest| {
                let progress = self.db.get_progress_by_quest(&quest.quest_id)?;
                Ok(QuestWithProgress { quest, progress })
            })
            .collect()
    }

    pub fn get_quest(&self, quest_id: &str) -> Result<QuestWithProgress, StatsError> {
        let quest = self
            .db
            .get_quest_by_quest_id(quest_id)?
            .ok_or_else(|| StatsError::QuestNotFound(quest_id.to_string()))?;
        let progress = self.db.get_progress_by_quest(&quest.quest_id)?;
        Ok(QuestWithProgress { quest, progress })
    }

    /// One user's progress rows across all quests.
    pub fn get_user_progress(&self, user_id: &str) -> Result<Vec<QuestProgress>, StatsError> {
        Ok(self.db.get_user_progress(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sync::{SyncQuestInput, SyncService};

    fn fixtures() -> (StatsService, SyncService) {
        let db = Database::open_in_memory().expect("Failed to create test DB");
        (StatsService::new(db.clone()), SyncService::new(db))
    }

    fn sync(svc: &SyncService, user_id: &str, quest_id: &str, completed: bool, unlocked: bool) {
        svc.sync_quest(&SyncQuestInput {
            user_id: user_id.into(),
            quest_id: quest_id.into(),
            quest_name: format!("Quest {quest_id}"),
            quest_line: None,
            completed,
            unlocked: Some(unlocked),
            description: None,
            task_logic: None,
            tasks: None,
            rewards: None,
            prerequisites: None,
            quest_line_id: None,
        })
        .unwrap();
    }

    #[test]
    fn stats_on_empty_store() {
        let (stats, _) = fixtures();
        let s = stats.get_stats("p1").unwrap();
        assert_eq!(s.total, 0);
        assert_eq!(s.percentage, 0);
        assert_eq!(s.locked, 0);
    }

    #[test]
    fn stats_for_user_without_progress() {
        let (stats, sync_svc) = fixtures();
        for i in 0..10 {
            sync(&sync_svc, "p1", &format!("q{i}"), false, true);
        }

        // A user with zero progress rows sees everything locked
        let s = stats.get_stats("unknown-user").unwrap();
        assert_eq!(s.total, 10);
        assert_eq!(s.completed, 0);
        assert_eq!(s.unlocked, 0);
        assert_eq!(s.locked, 10);
        assert_eq!(s.percentage, 0);
    }

    #[test]
    fn stats_counts_and_percentage() {
        let (stats, sync_svc) = fixtures();
        sync(&sync_svc, "p1", "q1", true, true);
        sync(&sync_svc, "p1", "q2", false, true);
        sync(&sync_svc, "p1", "q3", false, false);

        let s = stats.get_stats("p1").unwrap();
        assert_eq!(s.total, 3);
        assert_eq!(s.completed, 1);
        assert_eq!(s.unlocked, 1);
        assert_eq!(s.locked, 1);
        assert_eq!(s.percentage, 33);
    }

    #[test]
    fn percentage_rounds_half_up() {
        let (stats, sync_svc) = fixtures();
        for i in 0..8 {
            sync(&sync_svc, "p1", &format!("q{i}"), i < 3, true);
        }

        // 3/8 = 37.5% rounds to 38
        let s = stats.get_stats("p1").unwrap();
        assert_eq!(s.percentage, 38);
    }

    #[test]
    fn locked_may_go_negative_on_inconsistent_data() {
        // Progress rows can reference quests whose definitions never arrived
        // (delivery order is not guaranteed), so completed + unlocked can
        // exceed the definition count. locked goes negative; that is the
        // documented behavior, not a bug.
        let db = Database::open_in_memory().expect("Failed to create test DB");
        let stats = StatsService::new(db.clone());

        db.upsert_user("p1", "p1", "Steve").unwrap();
        for (row_id, quest_id, completed) in
            [("pr1", "q1", true), ("pr2", "q2", true), ("pr3", "q3", false)]
        {
            db.upsert_progress(
                row_id,
                &dashboard_db::quest_progress::ProgressUpsert {
                    user_id: "p1".into(),
                    quest_id: quest_id.into(),
                    quest_name: quest_id.to_uppercase(),
                    quest_line: None,
                    completed,
                    unlocked: true,
                    completed_at: None,
                },
            )
            .unwrap();
        }

        let s = stats.get_stats("p1").unwrap();
        assert_eq!(s.total, 0);
        assert_eq!(s.completed, 2);
        assert_eq!(s.unlocked, 1);
        assert_eq!(s.locked, -3);
        assert_eq!(s.percentage, 0);
    }
}
