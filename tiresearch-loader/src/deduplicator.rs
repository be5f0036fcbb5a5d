//! Collapse duplicate sizes
//!
//! Rows sharing (manufacturer, model, width, aspect_ratio, wheel_diameter)
//! are merged into one: categorical fields take the group mode, weight and
//! tire diameter take the group mean, and the sku is dropped since merged
//! rows may have come from several part numbers.

use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use std::collections::BTreeMap;
use tiresearch_common::db::{clear_tires, fetch_all_tires, insert_tire, TireSize};
use tiresearch_common::Result;
use tracing::info;

use crate::stats::{mean, mode, mode_present, OrdF64};

/// Natural key of a catalog row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DedupKey {
    pub manufacturer: String,
    pub model: String,
    pub width: i64,
    pub aspect_ratio: i64,
    pub wheel_diameter: OrdF64,
}

impl DedupKey {
    pub fn of(tire: &TireSize) -> Self {
        Self {
            manufacturer: tire.manufacturer.clone(),
            model: tire.model.clone(),
            width: tire.width,
            aspect_ratio: tire.aspect_ratio,
            wheel_diameter: OrdF64(tire.wheel_diameter),
        }
    }
}

/// Merge one key group into a single row; `None` for an empty group
pub fn aggregate_group(group: &[TireSize]) -> Option<TireSize> {
    let first = group.first()?;

    Some(TireSize {
        manufacturer: first.manufacturer.clone(),
        model: first.model.clone(),
        sku: None,
        width: first.width,
        aspect_ratio: first.aspect_ratio,
        wheel_diameter: first.wheel_diameter,
        min_wheel_width: mode(group.iter().map(|t| OrdF64(t.min_wheel_width)))?.0,
        max_wheel_width: mode(group.iter().map(|t| OrdF64(t.max_wheel_width)))?.0,
        weight: mean(group.iter().filter_map(|t| t.weight)),
        tire_diameter: mean(group.iter().filter_map(|t| t.tire_diameter)),
        asymmetrical: mode(group.iter().map(|t| t.asymmetrical))?,
        directional: mode(group.iter().map(|t| t.directional))?,
        treadwear: mode_present(group.iter().map(|t| t.treadwear)),
        tire_type: mode(group.iter().map(|t| t.tire_type))?,
        tire_rack_link: mode(group.iter().map(|t| t.tire_rack_link.as_str()))?.to_string(),
        manufacturer_link: mode(group.iter().map(|t| t.manufacturer_link.as_str()))?.to_string(),
        model_link: mode(group.iter().map(|t| t.model_link.as_str()))?.to_string(),
        notes: mode_present(group.iter().map(|t| t.notes.as_deref())).map(str::to_string),
    })
}

/// Group rows by key and merge each group, in key order
pub fn collapse(tires: Vec<TireSize>) -> Vec<TireSize> {
    let mut groups: BTreeMap<DedupKey, Vec<TireSize>> = BTreeMap::new();
    for tire in tires {
        groups.entry(DedupKey::of(&tire)).or_default().push(tire);
    }
    groups
        .values()
        .filter_map(|group| aggregate_group(group))
        .collect()
}

/// Row counts around deduplication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub rows_before: u64,
    pub rows_after: u64,
}

/// Replace the table contents with one row per key inside `tx`
pub async fn deduplicate(tx: &mut Transaction<'_, Sqlite>) -> Result<DedupReport> {
    let tires = fetch_all_tires(&mut **tx).await?;
    let rows_before = tires.len() as u64;

    let merged = collapse(tires);

    clear_tires(&mut **tx).await?;
    for tire in &merged {
        insert_tire(&mut **tx, tire).await?;
    }

    let report = DedupReport {
        rows_before,
        rows_after: merged.len() as u64,
    };
    info!(
        rows_before = report.rows_before,
        rows_after = report.rows_after,
        "Deduplication complete"
    );
    Ok(report)
}
