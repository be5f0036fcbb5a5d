//! Catalog rebuild pipeline
//!
//! Clear → load → impute → deduplicate, all inside one transaction. Any
//! storage error rolls the whole rebuild back and leaves the previously
//! committed table in place for readers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use tiresearch_common::catalog::Catalog;
use tiresearch_common::db::clear_tires;
use tiresearch_common::Result;
use tracing::info;
use uuid::Uuid;

use crate::deduplicator::{deduplicate, DedupReport};
use crate::imputer::{impute, ImputeReport};
use crate::loader::{load, LoadReport};

/// Everything a successful rebuild did
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Rows removed from the previous build
    pub cleared: u64,
    pub load: LoadReport,
    pub impute: ImputeReport,
    pub dedup: DedupReport,
}

/// Rebuild the `tires` table from `catalog`
///
/// `catalog_path` is only recorded in the `load_runs` history.
pub async fn rebuild_catalog(
    pool: &SqlitePool,
    catalog: &Catalog,
    catalog_path: Option<&Path>,
) -> Result<PipelineReport> {
    let run_id = Uuid::new_v4();
    let started_at = Utc::now();
    info!(%run_id, models = catalog.model_count(), "Starting catalog rebuild");

    let mut tx = pool.begin().await?;

    let cleared = clear_tires(&mut *tx).await?;
    let load_report = load(&mut tx, catalog).await?;
    let impute_report = impute(&mut tx).await?;
    let dedup_report = deduplicate(&mut tx).await?;

    let report = PipelineReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        cleared,
        load: load_report,
        impute: impute_report,
        dedup: dedup_report,
    };
    record_run(&mut tx, &report, catalog_path).await?;

    tx.commit().await?;

    info!(
        %run_id,
        inserted = report.load.inserted,
        rejected = report.load.rejected.len(),
        imputed = report.impute.values_imputed(),
        rows = report.dedup.rows_after,
        "Catalog rebuild committed"
    );

    Ok(report)
}

async fn record_run(
    tx: &mut Transaction<'_, Sqlite>,
    report: &PipelineReport,
    catalog_path: Option<&Path>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO load_runs (
            guid, catalog_path, started_at, finished_at,
            rows_inserted, rows_rejected, values_imputed, rows_final
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(report.run_id.to_string())
    .bind(catalog_path.map(|p| p.display().to_string()))
    .bind(report.started_at)
    .bind(report.finished_at)
    .bind(report.load.inserted as i64)
    .bind(report.load.rejected.len() as i64)
    .bind(report.impute.values_imputed() as i64)
    .bind(report.dedup.rows_after as i64)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
