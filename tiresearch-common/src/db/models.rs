//! Database models

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Tread/use category of a tire model
///
/// Stored and exchanged as the short code (`"2s"`, `"6w"`, ...). The numeric
/// prefix of each code gives the natural sort order from race tires to winter
/// tires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TireType {
    #[serde(rename = "0dotr")]
    DotRace,
    #[serde(rename = "1hps")]
    ExtremeSummer,
    #[serde(rename = "2s")]
    HpSummer,
    #[serde(rename = "3hpa")]
    HpAllSeason,
    #[serde(rename = "4a")]
    AllSeason,
    #[serde(rename = "5hpw")]
    HpWinter,
    #[serde(rename = "6w")]
    Winter,
}

impl TireType {
    pub const ALL: [TireType; 7] = [
        TireType::DotRace,
        TireType::ExtremeSummer,
        TireType::HpSummer,
        TireType::HpAllSeason,
        TireType::AllSeason,
        TireType::HpWinter,
        TireType::Winter,
    ];

    /// Short code stored in the `tire_type` column
    pub fn code(&self) -> &'static str {
        match self {
            TireType::DotRace => "0dotr",
            TireType::ExtremeSummer => "1hps",
            TireType::HpSummer => "2s",
            TireType::HpAllSeason => "3hpa",
            TireType::AllSeason => "4a",
            TireType::HpWinter => "5hpw",
            TireType::Winter => "6w",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TireType::DotRace => "DOT R",
            TireType::ExtremeSummer => "Extreme Summer",
            TireType::HpSummer => "HP Summer",
            TireType::HpAllSeason => "HP All Season",
            TireType::AllSeason => "All Season",
            TireType::HpWinter => "HP Winter",
            TireType::Winter => "Winter Ice/Snow",
        }
    }
}

impl fmt::Display for TireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TireType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TireType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown tire type code: {}", s)))
    }
}

/// One size variant of a tire model (one row of the `tires` table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireSize {
    pub manufacturer: String,
    pub model: String,
    pub sku: Option<String>,
    /// Section width in millimetres
    pub width: i64,
    /// Sidewall height as a percentage of width
    pub aspect_ratio: i64,
    /// Rim diameter in inches
    pub wheel_diameter: f64,
    /// Narrowest compatible rim width in inches
    pub min_wheel_width: f64,
    /// Widest compatible rim width in inches
    pub max_wheel_width: f64,
    /// Weight in pounds
    pub weight: Option<f64>,
    /// Overall tire diameter in inches
    pub tire_diameter: Option<f64>,
    pub asymmetrical: bool,
    pub directional: bool,
    pub treadwear: Option<i64>,
    pub tire_type: TireType,
    pub tire_rack_link: String,
    pub manufacturer_link: String,
    pub model_link: String,
    pub notes: Option<String>,
}

/// Column list matching [`TireSize::from_row`]
pub const TIRE_COLUMNS: &str = "manufacturer, model, sku, width, aspect_ratio, wheel_diameter, \
     min_wheel_width, max_wheel_width, weight, tire_diameter, asymmetrical, directional, \
     treadwear, tire_type, tire_rack_link, manufacturer_link, model_link, notes";

impl TireSize {
    /// Size code in the sidewall notation, e.g. `225/45R17`
    pub fn tire_code(&self) -> String {
        format!(
            "{}/{}R{}",
            self.width,
            self.aspect_ratio,
            self.wheel_diameter.trunc() as i64
        )
    }

    /// Compatible rim width range, e.g. `7.0 - 8.5`
    pub fn wheel_width_range(&self) -> String {
        format!("{:.1} - {:.1}", self.min_wheel_width, self.max_wheel_width)
    }

    /// Build from a row selected with [`TIRE_COLUMNS`]
    pub fn from_row(row: &SqliteRow) -> Result<Self> {
        let tire_type: String = row.try_get("tire_type")?;
        Ok(Self {
            manufacturer: row.try_get("manufacturer")?,
            model: row.try_get("model")?,
            sku: row.try_get("sku")?,
            width: row.try_get("width")?,
            aspect_ratio: row.try_get("aspect_ratio")?,
            wheel_diameter: row.try_get("wheel_diameter")?,
            min_wheel_width: row.try_get("min_wheel_width")?,
            max_wheel_width: row.try_get("max_wheel_width")?,
            weight: row.try_get("weight")?,
            tire_diameter: row.try_get("tire_diameter")?,
            asymmetrical: row.try_get("asymmetrical")?,
            directional: row.try_get("directional")?,
            treadwear: row.try_get("treadwear")?,
            tire_type: tire_type
                .parse()
                .map_err(|_| Error::Internal(format!("Invalid tire_type in database: {}", tire_type)))?,
            tire_rack_link: row.try_get("tire_rack_link")?,
            manufacturer_link: row.try_get("manufacturer_link")?,
            model_link: row.try_get("model_link")?,
            notes: row.try_get("notes")?,
        })
    }
}
