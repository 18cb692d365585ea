use super::test_db;

#[test]
fn test_open_and_migrate() {
    let db = test_db();
    // Verify tables exist by querying settings
    let settings = db.get_all_settings().unwrap();
    assert!(settings.is_empty());
}

#[test]
fn test_migrations_are_idempotent() {
    let db = test_db();
    db.with_conn(|conn| {
        crate::schema::run_migrations(conn)?;
        Ok(())
    })
    .unwrap();
}

#[test]
fn test_settings_crud() {
    let db = test_db();
    db.set_setting("key1", "value1", "normal").unwrap();
    assert_eq!(db.get_setting("key1").unwrap(), Some("value1".into()));

    db.set_setting("key1", "value2", "normal").unwrap();
    assert_eq!(db.get_setting("key1").unwrap(), Some("value2".into()));

    assert_eq!(db.get_setting("missing").unwrap(), None);
}
