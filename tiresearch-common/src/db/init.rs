//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to date.
//! Every statement is idempotent, so opening an existing database is safe.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets search requests keep reading the last committed catalog
    // while a rebuild transaction is open
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_tires_table(pool).await?;
    create_search_indexes(pool).await?;
    create_load_runs_table(pool).await?;
    Ok(())
}

async fn create_tires_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tires (
            guid TEXT PRIMARY KEY,
            manufacturer TEXT NOT NULL,
            model TEXT NOT NULL,
            sku TEXT,
            width INTEGER NOT NULL,
            aspect_ratio INTEGER NOT NULL,
            wheel_diameter REAL NOT NULL,
            min_wheel_width REAL NOT NULL,
            max_wheel_width REAL NOT NULL,
            weight REAL,
            tire_diameter REAL,
            asymmetrical INTEGER NOT NULL CHECK (asymmetrical IN (0, 1)),
            directional INTEGER NOT NULL CHECK (directional IN (0, 1)),
            treadwear INTEGER,
            tire_type TEXT NOT NULL,
            tire_rack_link TEXT NOT NULL DEFAULT '',
            manufacturer_link TEXT NOT NULL DEFAULT '',
            model_link TEXT NOT NULL DEFAULT '',
            notes TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// One composite index per search form
async fn create_search_indexes(pool: &SqlitePool) -> Result<()> {
    let indexes = [
        (
            "index_default_search",
            "wheel_diameter, tire_diameter, weight, width",
        ),
        (
            "index_standard_search",
            "manufacturer, width, wheel_diameter, tire_diameter, tire_type, weight, directional, asymmetrical",
        ),
        (
            "index_staggered_search",
            "manufacturer, width, wheel_diameter, tire_type, weight, directional, asymmetrical",
        ),
        (
            "index_hardcore_search",
            "manufacturer, width, aspect_ratio, wheel_diameter, tire_diameter, tire_type, weight, directional, asymmetrical",
        ),
    ];

    for (name, columns) in indexes {
        let sql = format!("CREATE INDEX IF NOT EXISTS {} ON tires ({})", name, columns);
        sqlx::query(&sql).execute(pool).await?;
    }

    Ok(())
}

async fn create_load_runs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS load_runs (
            guid TEXT PRIMARY KEY,
            catalog_path TEXT,
            started_at TIMESTAMP NOT NULL,
            finished_at TIMESTAMP NOT NULL,
            rows_inserted INTEGER NOT NULL,
            rows_rejected INTEGER NOT NULL,
            values_imputed INTEGER NOT NULL,
            rows_final INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
