//! Tire catalog definition
//!
//! The catalog is the hand-curated source of truth the loader rebuilds the
//! `tires` table from. It is a TOML document keyed by manufacturer, then by
//! model name:
//!
//! ```toml
//! [manufacturers.Toyo."Proxes R888"]
//! asymmetrical = false
//! directional = true
//! treadwear = 100
//! tire_type = "0dotr"
//! manufacturer_link = "http://toyotires.com/"
//!
//! [manufacturers.Toyo."Proxes R888".sizes]
//! "17" = [
//!   { sku = "168170", width = 225, aspect_ratio = 45, weight = 24.5, tire_diameter = 25.0, min_wheel_width = 7.0, max_wheel_width = 8.5 },
//! ]
//!
//! [manufacturers.Toyo."Proxes RA1"]
//! asymmetrical = false
//! directional = true
//! tire_type = "0dotr"
//! sizes = "toyo/proxes_ra_1.csv"
//! ```
//!
//! `sizes` is either a table of wheel diameter → size records, or a path
//! (relative to the catalog file) to a comma-separated size file.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::db::TireType;
use crate::{Error, Result};

/// Parsed catalog: manufacturer → model → specification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub manufacturers: BTreeMap<String, BTreeMap<String, ModelSpec>>,

    /// Directory relative size-file paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Model-level metadata inherited by every size of the model
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    /// Unset for models whose sizes differ in asymmetry
    #[serde(default)]
    pub asymmetrical: Option<bool>,
    #[serde(default)]
    pub directional: Option<bool>,
    #[serde(default)]
    pub treadwear: Option<i64>,
    pub tire_type: TireType,
    #[serde(default)]
    pub tire_rack_link: String,
    #[serde(default)]
    pub manufacturer_link: String,
    #[serde(default)]
    pub model_link: String,
    pub sizes: SizeSource,
}

/// Where a model's size list comes from
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SizeSource {
    /// Comma-separated size file
    File(PathBuf),
    /// Wheel diameter (as written, e.g. `"17"`) → size records
    Inline(BTreeMap<String, Vec<SizeRecord>>),
}

/// One inline size entry
///
/// Everything is optional here; presence of required fields is checked by
/// the loader so that a bad entry is reported instead of failing the parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeRecord {
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub aspect_ratio: Option<i64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub tire_diameter: Option<f64>,
    #[serde(default)]
    pub min_wheel_width: Option<f64>,
    #[serde(default)]
    pub max_wheel_width: Option<f64>,
    /// Per-size override of the model value
    #[serde(default)]
    pub asymmetrical: Option<bool>,
    /// Per-size override of the model value
    #[serde(default)]
    pub directional: Option<bool>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Catalog {
    /// Read and parse a catalog file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::parse(&content, base_dir)
            .map_err(|e| Error::Catalog(format!("{}: {}", path.display(), e)))
    }

    /// Parse catalog text, resolving relative size files against `base_dir`
    pub fn parse(content: &str, base_dir: PathBuf) -> Result<Self> {
        let mut catalog: Catalog =
            toml::from_str(content).map_err(|e| Error::Catalog(e.to_string()))?;
        catalog.base_dir = base_dir;
        Ok(catalog)
    }

    /// Absolute location of a size file referenced by the catalog
    pub fn resolve_size_file(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Iterate (manufacturer, model, spec) in catalog order
    pub fn models(&self) -> impl Iterator<Item = (&str, &str, &ModelSpec)> {
        self.manufacturers.iter().flat_map(|(manufacturer, models)| {
            models
                .iter()
                .map(move |(model, spec)| (manufacturer.as_str(), model.as_str(), spec))
        })
    }

    pub fn model_count(&self) -> usize {
        self.manufacturers.values().map(BTreeMap::len).sum()
    }
}
