use super::test_db;
use crate::DbError;

#[test]
fn test_upsert_user_by_uuid() {
    let db = test_db();
    let created = db.upsert_user("u1", "aaaa-bbbb", "Steve").unwrap();
    assert_eq!(created.id, "u1");
    assert_eq!(created.username, "Steve");

    // Same UUID, new username: updates in place, keeps the original id
    let updated = db.upsert_user("u2", "aaaa-bbbb", "Steve64").unwrap();
    assert_eq!(updated.id, "u1");
    assert_eq!(updated.username, "Steve64");

    let all = db.get_all_users_with_counts().unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn test_ensure_user_is_conditional() {
    let db = test_db();
    db.upsert_user("u1", "aaaa-bbbb", "Steve").unwrap();

    // Ensuring an existing id never overwrites anything
    db.ensure_user("u1", "u1", "Unknown").unwrap();
    let user = db.get_user("u1").unwrap().unwrap();
    assert_eq!(user.username, "Steve");
    assert_eq!(user.minecraft_uuid, "aaaa-bbbb");

    db.ensure_user("p9", "p9", "Unknown").unwrap();
    db.ensure_user("p9", "p9", "Unknown").unwrap();
    let all = db.get_all_users_with_counts().unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn test_user_counts() {
    let db = test_db();
    db.upsert_user("u1", "aaaa", "Steve").unwrap();

    let task = crate::tasks::Task {
        id: "t1".into(),
        title: "Build LV circuits".into(),
        description: None,
        status: "TODO".into(),
        priority: "MEDIUM".into(),
        assigned_to_id: Some("u1".into()),
        quest_id: None,
        quest_name: None,
        created_at: None,
        updated_at: None,
    };
    db.insert_task(&task).unwrap();

    let progress = crate::quest_progress::ProgressUpsert {
        user_id: "u1".into(),
        quest_id: "q1".into(),
        quest_name: "First Steps".into(),
        quest_line: None,
        completed: false,
        unlocked: true,
        completed_at: None,
    };
    db.upsert_progress("pr1", &progress).unwrap();

    let all = db.get_all_users_with_counts().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].task_count, 1);
    assert_eq!(all[0].progress_count, 1);
}

#[test]
fn test_delete_user() {
    let db = test_db();
    db.upsert_user("u1", "aaaa", "Steve").unwrap();

    let deleted = db.delete_user("u1").unwrap();
    assert_eq!(deleted.username, "Steve");
    assert!(db.get_user("u1").unwrap().is_none());

    let err = db.delete_user("u1").unwrap_err();
    assert!(matches!(err, DbError::NotFound(_)));
}
