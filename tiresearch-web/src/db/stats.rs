//! Catalog summary queries

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use tiresearch_common::Result;

/// Distinct manufacturers, alphabetical
pub async fn list_manufacturers(pool: &SqlitePool) -> Result<Vec<String>> {
    let brands = sqlx::query_scalar("SELECT DISTINCT manufacturer FROM tires ORDER BY 1 ASC")
        .fetch_all(pool)
        .await?;
    Ok(brands)
}

/// Admin overview of what the catalog currently holds
#[derive(Debug, Clone, Serialize)]
pub struct TireStats {
    pub total_tires: i64,
    pub brands: Vec<String>,
    /// Tire type codes present, in code order
    pub types: Vec<String>,
    /// type code → brand → model names; every brand is listed under every type
    pub models: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub last_run: Option<LoadRunSummary>,
}

/// Most recent row of `load_runs`
#[derive(Debug, Clone, Serialize)]
pub struct LoadRunSummary {
    pub run_id: String,
    pub catalog_path: Option<String>,
    pub finished_at: DateTime<Utc>,
    pub rows_inserted: i64,
    pub rows_rejected: i64,
    pub values_imputed: i64,
    pub rows_final: i64,
}

pub async fn tire_stats(pool: &SqlitePool) -> Result<TireStats> {
    let total_tires: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tires")
        .fetch_one(pool)
        .await?;

    let brands = list_manufacturers(pool).await?;
    let types: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT tire_type FROM tires ORDER BY 1 ASC")
            .fetch_all(pool)
            .await?;

    let mut models: BTreeMap<String, BTreeMap<String, Vec<String>>> = types
        .iter()
        .map(|t| {
            let per_brand = brands.iter().map(|b| (b.clone(), Vec::new())).collect();
            (t.clone(), per_brand)
        })
        .collect();

    let rows = sqlx::query(
        "SELECT DISTINCT tire_type, manufacturer, model FROM tires ORDER BY 1 ASC, 2 ASC, 3 ASC",
    )
    .fetch_all(pool)
    .await?;
    for row in rows {
        let tire_type: String = row.try_get("tire_type")?;
        let manufacturer: String = row.try_get("manufacturer")?;
        let model: String = row.try_get("model")?;
        models
            .entry(tire_type)
            .or_default()
            .entry(manufacturer)
            .or_default()
            .push(model);
    }

    let last_run = sqlx::query(
        "SELECT guid, catalog_path, finished_at, rows_inserted, rows_rejected, values_imputed, rows_final \
         FROM load_runs ORDER BY finished_at DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await?
    .map(|row| -> Result<LoadRunSummary> {
        Ok(LoadRunSummary {
            run_id: row.try_get("guid")?,
            catalog_path: row.try_get("catalog_path")?,
            finished_at: row.try_get("finished_at")?,
            rows_inserted: row.try_get("rows_inserted")?,
            rows_rejected: row.try_get("rows_rejected")?,
            values_imputed: row.try_get("values_imputed")?,
            rows_final: row.try_get("rows_final")?,
        })
    })
    .transpose()?;

    Ok(TireStats {
        total_tires,
        brands,
        types,
        models,
        last_run,
    })
}
