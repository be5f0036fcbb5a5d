//! `tires` table operations shared by the loader and the web service

use sqlx::SqliteConnection;
use uuid::Uuid;

use super::models::{TireSize, TIRE_COLUMNS};
use crate::Result;

/// Insert one tire size row, returning its generated guid
pub async fn insert_tire(conn: &mut SqliteConnection, tire: &TireSize) -> Result<Uuid> {
    let guid = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO tires (
            guid, manufacturer, model, sku, width, aspect_ratio, wheel_diameter,
            min_wheel_width, max_wheel_width, weight, tire_diameter,
            asymmetrical, directional, treadwear, tire_type,
            tire_rack_link, manufacturer_link, model_link, notes,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(guid.to_string())
    .bind(&tire.manufacturer)
    .bind(&tire.model)
    .bind(&tire.sku)
    .bind(tire.width)
    .bind(tire.aspect_ratio)
    .bind(tire.wheel_diameter)
    .bind(tire.min_wheel_width)
    .bind(tire.max_wheel_width)
    .bind(tire.weight)
    .bind(tire.tire_diameter)
    .bind(tire.asymmetrical)
    .bind(tire.directional)
    .bind(tire.treadwear)
    .bind(tire.tire_type.code())
    .bind(&tire.tire_rack_link)
    .bind(&tire.manufacturer_link)
    .bind(&tire.model_link)
    .bind(&tire.notes)
    .execute(&mut *conn)
    .await?;

    Ok(guid)
}

/// Load every row, ordered by the natural catalog key
pub async fn fetch_all_tires(conn: &mut SqliteConnection) -> Result<Vec<TireSize>> {
    let sql = format!(
        "SELECT {} FROM tires ORDER BY manufacturer, model, width, aspect_ratio, wheel_diameter",
        TIRE_COLUMNS
    );
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    rows.iter().map(TireSize::from_row).collect()
}

/// Delete every row, returning how many were removed
pub async fn clear_tires(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tires").execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Count rows in the table
pub async fn count_tires(conn: &mut SqliteConnection) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tires")
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}
