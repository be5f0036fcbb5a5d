//! Unit tests for database initialization
//!
//! Tests automatic database creation, idempotent schema setup, and the
//! NOT NULL / CHECK constraints on the `tires` table.

use tiresearch_common::db::init::init_database;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("tires.db");

    let result = init_database(&db_path).await;

    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("tires.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_tables_created() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("tires.db")).await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(tables.contains(&"tires".to_string()));
    assert!(tables.contains(&"load_runs".to_string()));
}

#[tokio::test]
async fn test_required_columns_are_not_null() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("tires.db")).await.unwrap();

    // min_wheel_width missing
    let result = sqlx::query(
        r#"
        INSERT INTO tires (guid, manufacturer, model, width, aspect_ratio, wheel_diameter,
                           max_wheel_width, asymmetrical, directional, tire_type)
        VALUES ('g1', 'Acme', 'Racer', 225, 45, 17.0, 8.5, 0, 1, '2s')
        "#,
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Row without min_wheel_width should be rejected");
}
