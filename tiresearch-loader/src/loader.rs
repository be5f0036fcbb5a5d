//! Catalog loader
//!
//! Expands every size entry of the catalog into a [`TireSize`] row. Inline
//! size tables and comma-separated size files go through the same
//! validation: an entry missing a required field is skipped and reported in
//! the [`LoadReport`], and loading carries on with the next entry.
//!
//! Size files have no header and fixed column positions:
//!
//! | column | field           |
//! |--------|-----------------|
//! | 0      | width           |
//! | 1      | aspect_ratio    |
//! | 2      | wheel_diameter  |
//! | 7      | weight          |
//! | 8      | min_wheel_width |
//! | 9      | max_wheel_width |
//! | 13     | tire_diameter   |
//!
//! Blank or absent columns read as missing.

use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use tiresearch_common::catalog::{Catalog, ModelSpec, SizeRecord, SizeSource};
use tiresearch_common::db::{insert_tire, TireSize, TireType};
use tiresearch_common::{Error, Result};
use tracing::{debug, info, warn};

use crate::error::LoadError;

const COL_WIDTH: usize = 0;
const COL_ASPECT_RATIO: usize = 1;
const COL_WHEEL_DIAMETER: usize = 2;
const COL_WEIGHT: usize = 7;
const COL_MIN_WHEEL_WIDTH: usize = 8;
const COL_MAX_WHEEL_WIDTH: usize = 9;
const COL_TIRE_DIAMETER: usize = 13;

/// A size entry before validation
#[derive(Debug, Clone, PartialEq)]
pub struct SizeCandidate {
    pub manufacturer: String,
    pub model: String,
    pub sku: Option<String>,
    pub width: Option<i64>,
    pub aspect_ratio: Option<i64>,
    pub wheel_diameter: Option<f64>,
    pub min_wheel_width: Option<f64>,
    pub max_wheel_width: Option<f64>,
    pub weight: Option<f64>,
    pub tire_diameter: Option<f64>,
    pub asymmetrical: Option<bool>,
    pub directional: Option<bool>,
    pub treadwear: Option<i64>,
    pub tire_type: TireType,
    pub tire_rack_link: String,
    pub manufacturer_link: String,
    pub model_link: String,
    pub notes: Option<String>,
}

impl SizeCandidate {
    /// Candidate carrying only the model-level metadata
    fn inherit(manufacturer: &str, model: &str, spec: &ModelSpec) -> Self {
        Self {
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            sku: None,
            width: None,
            aspect_ratio: None,
            wheel_diameter: None,
            min_wheel_width: None,
            max_wheel_width: None,
            weight: None,
            tire_diameter: None,
            asymmetrical: spec.asymmetrical,
            directional: spec.directional,
            treadwear: spec.treadwear,
            tire_type: spec.tire_type,
            tire_rack_link: spec.tire_rack_link.clone(),
            manufacturer_link: spec.manufacturer_link.clone(),
            model_link: spec.model_link.clone(),
            notes: None,
        }
    }

    /// Size code for reporting; unknown parts print as `?`
    pub fn size_code(&self) -> String {
        fn part<T: ToString>(value: Option<T>) -> String {
            value.map_or_else(|| "?".to_string(), |v| v.to_string())
        }
        format!(
            "{}/{}R{}",
            part(self.width),
            part(self.aspect_ratio),
            part(self.wheel_diameter.map(|d| d.trunc() as i64))
        )
    }

    /// Check required fields and produce the row to insert
    pub fn validate(self) -> std::result::Result<TireSize, LoadError> {
        fn required<T>(value: Option<T>, field: &'static str) -> std::result::Result<T, LoadError> {
            value.ok_or(LoadError::MissingField { field })
        }

        // NaN and infinities parse as f64 but SQLite stores NaN as NULL
        fn finite(
            value: Option<f64>,
            field: &'static str,
        ) -> std::result::Result<Option<f64>, LoadError> {
            match value {
                Some(v) if !v.is_finite() => Err(LoadError::InvalidField {
                    field,
                    value: v.to_string(),
                }),
                other => Ok(other),
            }
        }

        if self.manufacturer.trim().is_empty() {
            return Err(LoadError::MissingField { field: "manufacturer" });
        }
        if self.model.trim().is_empty() {
            return Err(LoadError::MissingField { field: "model" });
        }

        let wheel_diameter = finite(self.wheel_diameter, "wheel_diameter")?;
        let min_wheel_width = finite(self.min_wheel_width, "min_wheel_width")?;
        let max_wheel_width = finite(self.max_wheel_width, "max_wheel_width")?;
        let weight = finite(self.weight, "weight")?;
        let tire_diameter = finite(self.tire_diameter, "tire_diameter")?;

        Ok(TireSize {
            width: required(self.width, "width")?,
            aspect_ratio: required(self.aspect_ratio, "aspect_ratio")?,
            wheel_diameter: required(wheel_diameter, "wheel_diameter")?,
            min_wheel_width: required(min_wheel_width, "min_wheel_width")?,
            max_wheel_width: required(max_wheel_width, "max_wheel_width")?,
            asymmetrical: required(self.asymmetrical, "asymmetrical")?,
            directional: required(self.directional, "directional")?,
            manufacturer: self.manufacturer,
            model: self.model,
            sku: self.sku,
            weight,
            tire_diameter,
            treadwear: self.treadwear,
            tire_type: self.tire_type,
            tire_rack_link: self.tire_rack_link,
            manufacturer_link: self.manufacturer_link,
            model_link: self.model_link,
            notes: self.notes,
        })
    }
}

/// A size entry that was not loaded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub manufacturer: String,
    pub model: String,
    pub size_code: String,
    pub error: LoadError,
}

/// Validated rows plus everything that was turned away
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub accepted: Vec<TireSize>,
    pub rejected: Vec<Rejection>,
}

impl CandidateSet {
    fn push(&mut self, candidate: SizeCandidate) {
        let manufacturer = candidate.manufacturer.clone();
        let model = candidate.model.clone();
        let size_code = candidate.size_code();
        match candidate.validate() {
            Ok(tire) => self.accepted.push(tire),
            Err(error) => self.rejected.push(Rejection {
                manufacturer,
                model,
                size_code,
                error,
            }),
        }
    }

    fn reject(&mut self, candidate: &SizeCandidate, error: LoadError) {
        self.rejected.push(Rejection {
            manufacturer: candidate.manufacturer.clone(),
            model: candidate.model.clone(),
            size_code: candidate.size_code(),
            error,
        });
    }
}

/// Outcome of the load phase
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub inserted: u64,
    pub rejected: Vec<Rejection>,
}

/// Expand the catalog into validated rows
///
/// Reads referenced size files from disk. A size file that cannot be opened
/// is a catalog error and fails the whole collection; a line that cannot be
/// used only rejects that line.
pub fn collect_candidates(catalog: &Catalog) -> Result<CandidateSet> {
    let mut set = CandidateSet::default();

    for (manufacturer, model, spec) in catalog.models() {
        let base = SizeCandidate::inherit(manufacturer, model, spec);
        match &spec.sizes {
            SizeSource::Inline(by_diameter) => {
                for (diameter_key, records) in by_diameter {
                    for record in records {
                        collect_inline(&mut set, &base, diameter_key, record);
                    }
                }
            }
            SizeSource::File(relative) => {
                let path = catalog.resolve_size_file(relative);
                debug!(manufacturer, model, path = %path.display(), "Reading size file");
                collect_size_file(&mut set, &base, &path)?;
            }
        }
    }

    Ok(set)
}

fn collect_inline(
    set: &mut CandidateSet,
    base: &SizeCandidate,
    diameter_key: &str,
    record: &SizeRecord,
) {
    let mut candidate = base.clone();
    candidate.sku = record.sku.clone();
    candidate.width = record.width;
    candidate.aspect_ratio = record.aspect_ratio;
    candidate.weight = record.weight;
    candidate.tire_diameter = record.tire_diameter;
    candidate.min_wheel_width = record.min_wheel_width;
    candidate.max_wheel_width = record.max_wheel_width;
    candidate.notes = record.notes.clone();
    if record.asymmetrical.is_some() {
        candidate.asymmetrical = record.asymmetrical;
    }
    if record.directional.is_some() {
        candidate.directional = record.directional;
    }

    match diameter_key.trim().parse::<f64>() {
        Ok(diameter) if diameter.is_finite() => {
            candidate.wheel_diameter = Some(diameter);
            set.push(candidate);
        }
        _ => set.reject(
            &candidate,
            LoadError::InvalidField {
                field: "wheel_diameter",
                value: diameter_key.to_string(),
            },
        ),
    }
}

fn collect_size_file(set: &mut CandidateSet, base: &SizeCandidate, path: &Path) -> Result<()> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::Catalog(format!("Failed to open size file {}: {}", path.display(), e))
    })?;
    collect_size_reader(set, base, file);
    Ok(())
}

/// Read size lines from any reader (split out so tests need no files)
fn collect_size_reader<R: std::io::Read>(set: &mut CandidateSet, base: &SizeCandidate, reader: R) {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    for (index, result) in csv_reader.records().enumerate() {
        let line = index as u64 + 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                set.reject(
                    base,
                    LoadError::MalformedLine {
                        line,
                        message: e.to_string(),
                    },
                );
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        match size_from_record(base, &record) {
            Ok(candidate) => set.push(candidate),
            Err(error) => set.reject(base, error),
        }
    }
}

fn size_from_record(
    base: &SizeCandidate,
    record: &csv::StringRecord,
) -> std::result::Result<SizeCandidate, LoadError> {
    let mut candidate = base.clone();
    candidate.width = column(record, COL_WIDTH, "width")?;
    candidate.aspect_ratio = column(record, COL_ASPECT_RATIO, "aspect_ratio")?;
    candidate.wheel_diameter = column(record, COL_WHEEL_DIAMETER, "wheel_diameter")?;
    candidate.weight = column(record, COL_WEIGHT, "weight")?;
    candidate.min_wheel_width = column(record, COL_MIN_WHEEL_WIDTH, "min_wheel_width")?;
    candidate.max_wheel_width = column(record, COL_MAX_WHEEL_WIDTH, "max_wheel_width")?;
    candidate.tire_diameter = column(record, COL_TIRE_DIAMETER, "tire_diameter")?;
    Ok(candidate)
}

/// Parse one optional column; blank and absent both read as `None`
fn column<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    field: &'static str,
) -> std::result::Result<Option<T>, LoadError> {
    match record.get(index).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| LoadError::InvalidField {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Insert every valid size entry of the catalog inside `tx`
///
/// Size files are read on the blocking pool before any row is written.
pub async fn load(tx: &mut Transaction<'_, Sqlite>, catalog: &Catalog) -> Result<LoadReport> {
    let owned = catalog.clone();
    let set = tokio::task::spawn_blocking(move || collect_candidates(&owned))
        .await
        .map_err(|e| Error::Internal(format!("Catalog reader task failed: {}", e)))??;

    for rejection in &set.rejected {
        warn!(
            manufacturer = %rejection.manufacturer,
            model = %rejection.model,
            size = %rejection.size_code,
            error = %rejection.error,
            "Skipping invalid tire size"
        );
    }

    let mut inserted = 0u64;
    for tire in &set.accepted {
        insert_tire(&mut **tx, tire).await?;
        inserted += 1;
    }

    info!(
        models = catalog.model_count(),
        inserted,
        rejected = set.rejected.len(),
        "Catalog loaded"
    );

    Ok(LoadReport {
        inserted,
        rejected: set.rejected,
    })
}
