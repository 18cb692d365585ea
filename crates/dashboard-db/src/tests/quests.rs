use super::test_db;
use crate::quests::QuestUpsert;
use crate::Database;
use serde_json::json;

fn basic_upsert(quest_id: &str, name: &str) -> QuestUpsert {
    QuestUpsert {
        quest_id: quest_id.into(),
        name: name.into(),
        description: None,
        task_logic: "AND".into(),
        tasks: None,
        rewards: None,
        prerequisites: vec![],
        quest_line_id: None,
    }
}

fn sync_line(db: &Database, internal_id: &str, quest_line_id: &str, name: &str, order: i64) {
    db.upsert_quest_line(internal_id, quest_line_id, name, None, order)
        .unwrap();
}

#[test]
fn test_quest_upsert_by_natural_key() {
    let db = test_db();
    let created = db.upsert_quest("i1", &basic_upsert("gt:first_steps", "First Steps")).unwrap();
    assert_eq!(created.id, "i1");
    assert_eq!(created.name, "First Steps");
    assert_eq!(created.task_logic, "AND");
    assert!(created.prerequisites.is_empty());

    // Re-sync with new fields: updates in place, no duplicate
    let mut upsert = basic_upsert("gt:first_steps", "First Steps (revised)");
    upsert.description = Some("Punch a tree".into());
    upsert.prerequisites = vec!["gt:intro".into()];
    let updated = db.upsert_quest("i2", &upsert).unwrap();
    assert_eq!(updated.id, "i1");
    assert_eq!(updated.name, "First Steps (revised)");
    assert_eq!(updated.description, Some("Punch a tree".into()));
    assert_eq!(updated.prerequisites, vec!["gt:intro".to_string()]);
    assert_eq!(db.count_quests().unwrap(), 1);
}

#[test]
fn test_quest_update_never_moves_between_lines() {
    let db = test_db();
    sync_line(&db, "l1", "line:stone_age", "Stone Age", 0);
    sync_line(&db, "l2", "line:steam_age", "Steam Age", 1);

    let mut upsert = basic_upsert("gt:first_steps", "First Steps");
    upsert.quest_line_id = Some("l1".into());
    let created = db.upsert_quest("i1", &upsert).unwrap();
    assert_eq!(created.quest_line_id, Some("l1".into()));

    // The line reference is only applied on creation
    let mut upsert = basic_upsert("gt:first_steps", "First Steps");
    upsert.quest_line_id = Some("l2".into());
    let updated = db.upsert_quest("i2", &upsert).unwrap();
    assert_eq!(updated.quest_line_id, Some("l1".into()));
}

#[test]
fn test_quest_json_payloads_roundtrip() {
    let db = test_db();
    let mut upsert = basic_upsert("gt:smelt_iron", "Smelt Iron");
    upsert.tasks = Some(json!([{ "item": "minecraft:iron_ingot", "count": 3 }]));
    upsert.rewards = Some(json!({ "xp": 10 }));
    let quest = db.upsert_quest("i1", &upsert).unwrap();

    let got = db.get_quest_by_quest_id("gt:smelt_iron").unwrap().unwrap();
    assert_eq!(got.tasks, quest.tasks);
    assert_eq!(
        got.tasks.unwrap()[0]["item"],
        json!("minecraft:iron_ingot")
    );
    assert_eq!(got.rewards, Some(json!({ "xp": 10 })));
}

#[test]
fn test_quest_line_resync_updates_in_place() {
    let db = test_db();
    sync_line(&db, "l1", "line:stone_age", "Stone Age", 0);
    db.upsert_quest_line("l2", "line:stone_age", "The Stone Age", Some("Where it begins"), 5)
        .unwrap();

    assert_eq!(db.count_quest_lines().unwrap(), 1);
    let lines = db.get_all_quest_lines().unwrap();
    assert_eq!(lines[0].id, "l1");
    assert_eq!(lines[0].name, "The Stone Age");
    assert_eq!(lines[0].description, Some("Where it begins".into()));
    assert_eq!(lines[0].display_order, 5);
}

#[test]
fn test_quest_lines_ordered_by_display_order() {
    let db = test_db();
    sync_line(&db, "l1", "line:steam_age", "Steam Age", 2);
    sync_line(&db, "l2", "line:stone_age", "Stone Age", 1);
    sync_line(&db, "l3", "line:lv_age", "LV Age", 3);

    let names: Vec<String> = db
        .get_all_quest_lines()
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Stone Age", "Steam Age", "LV Age"]);
}

#[test]
fn test_quest_lines_with_progress_filters_by_user() {
    let db = test_db();
    db.upsert_user("p1", "p1", "Steve").unwrap();
    db.upsert_user("p2", "p2", "Alex").unwrap();
    sync_line(&db, "l1", "line:stone_age", "Stone Age", 0);

    let mut upsert = basic_upsert("gt:first_steps", "First Steps");
    upsert.quest_line_id = Some("l1".into());
    db.upsert_quest("i1", &upsert).unwrap();

    for (row_id, user) in [("pr1", "p1"), ("pr2", "p2")] {
        db.upsert_progress(
            row_id,
            &crate::quest_progress::ProgressUpsert {
                user_id: user.into(),
                quest_id: "gt:first_steps".into(),
                quest_name: "First Steps".into(),
                quest_line: Some("Stone Age".into()),
                completed: user == "p1",
                unlocked: true,
                completed_at: None,
            },
        )
        .unwrap();
    }

    let lines = db.get_quest_lines_with_progress(Some("p1")).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quests.len(), 1);
    let progress = &lines[0].quests[0].progress;
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].user_id, "p1");
    assert!(progress[0].completed);

    // Without a user filter every player's rows come back
    let lines = db.get_quest_lines_with_progress(None).unwrap();
    assert_eq!(lines[0].quests[0].progress.len(), 2);
}

#[test]
fn test_quests_by_line() {
    let db = test_db();
    sync_line(&db, "l1", "line:stone_age", "Stone Age", 0);

    let mut upsert = basic_upsert("gt:first_steps", "First Steps");
    upsert.quest_line_id = Some("l1".into());
    db.upsert_quest("i1", &upsert).unwrap();
    db.upsert_quest("i2", &basic_upsert("gt:loose", "Loose Quest")).unwrap();

    let quests = db.get_quests_by_line("l1").unwrap();
    assert_eq!(quests.len(), 1);
    assert_eq!(quests[0].quest_id, "gt:first_steps");
}
