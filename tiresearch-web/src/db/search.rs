//! Tire search queries
//!
//! Every search form reduces to a [`TireFilter`] plus a sort list. Unset
//! criteria add no condition, so an empty filter matches the whole table.

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::fmt;
use std::str::FromStr;
use tiresearch_common::db::{TireSize, TireType, TIRE_COLUMNS};
use tiresearch_common::{Error, Result};

/// Inclusive bounds; either side may be open
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T: Copy> Bounds<T> {
    pub fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn exactly(value: T) -> Self {
        Self::between(value, value)
    }
}

/// Search criteria
#[derive(Debug, Clone, Default)]
pub struct TireFilter {
    /// Empty matches every manufacturer
    pub manufacturers: Vec<String>,
    pub model: Option<String>,
    pub width: Bounds<i64>,
    pub aspect_ratio: Bounds<i64>,
    pub wheel_diameter: Bounds<f64>,
    pub tire_diameter: Bounds<f64>,
    pub weight: Bounds<f64>,
    /// Rim width that must fall inside the tire's compatible range
    pub wheel_width: Option<f64>,
    /// Empty matches every type
    pub tire_types: Vec<TireType>,
    /// `None` matches both
    pub asymmetrical: Option<bool>,
    /// `None` matches both
    pub directional: Option<bool>,
}

/// Columns results may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Manufacturer,
    Model,
    Width,
    WheelDiameter,
    TireDiameter,
    AspectRatio,
    TireType,
    Weight,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Manufacturer,
        SortField::Model,
        SortField::Width,
        SortField::WheelDiameter,
        SortField::TireDiameter,
        SortField::AspectRatio,
        SortField::TireType,
        SortField::Weight,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Manufacturer => "manufacturer",
            SortField::Model => "model",
            SortField::Width => "width",
            SortField::WheelDiameter => "wheel_diameter",
            SortField::TireDiameter => "tire_diameter",
            SortField::AspectRatio => "aspect_ratio",
            SortField::TireType => "tire_type",
            SortField::Weight => "weight",
        }
    }

    /// Label shown in search forms
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Manufacturer => "Brand",
            SortField::Model => "Model",
            SortField::Width => "Width",
            SortField::WheelDiameter => "Wheel Diameter",
            SortField::TireDiameter => "Tire Diameter",
            SortField::AspectRatio => "Profile",
            SortField::TireType => "Tire Type",
            SortField::Weight => "Weight",
        }
    }
}

impl FromStr for SortField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        SortField::ALL
            .iter()
            .copied()
            .find(|f| f.column() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown sort field: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Asc => "Ascending",
            SortOrder::Desc => "Descending",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::InvalidInput(format!("Unknown sort order: {}", other))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortKey {
    pub const fn asc(field: SortField) -> Self {
        Self {
            field,
            order: SortOrder::Asc,
        }
    }
}

/// Ordering used when a request names none
pub const DEFAULT_SORT: [SortKey; 5] = [
    SortKey::asc(SortField::TireType),
    SortKey::asc(SortField::Manufacturer),
    SortKey::asc(SortField::Model),
    SortKey::asc(SortField::WheelDiameter),
    SortKey::asc(SortField::Width),
];

/// LIMIT/OFFSET window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

fn push_bounds<'a, T>(qb: &mut QueryBuilder<'a, Sqlite>, column: &str, bounds: &Bounds<T>)
where
    T: Copy + 'a + sqlx::Encode<'a, Sqlite> + sqlx::Type<Sqlite> + Send,
{
    if let Some(min) = bounds.min {
        qb.push(format!(" AND {} >= ", column)).push_bind(min);
    }
    if let Some(max) = bounds.max {
        qb.push(format!(" AND {} <= ", column)).push_bind(max);
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &TireFilter) {
    qb.push(" WHERE 1 = 1");

    if !filter.manufacturers.is_empty() {
        qb.push(" AND manufacturer IN (");
        let mut list = qb.separated(", ");
        for manufacturer in &filter.manufacturers {
            list.push_bind(manufacturer.clone());
        }
        list.push_unseparated(")");
    }

    if let Some(model) = &filter.model {
        qb.push(" AND model = ").push_bind(model.clone());
    }

    push_bounds(qb, "width", &filter.width);
    push_bounds(qb, "aspect_ratio", &filter.aspect_ratio);
    push_bounds(qb, "wheel_diameter", &filter.wheel_diameter);
    push_bounds(qb, "tire_diameter", &filter.tire_diameter);
    push_bounds(qb, "weight", &filter.weight);

    if let Some(wheel_width) = filter.wheel_width {
        qb.push(" AND min_wheel_width <= ")
            .push_bind(wheel_width)
            .push(" AND max_wheel_width >= ")
            .push_bind(wheel_width);
    }

    if !filter.tire_types.is_empty() {
        qb.push(" AND tire_type IN (");
        let mut list = qb.separated(", ");
        for tire_type in &filter.tire_types {
            list.push_bind(tire_type.code());
        }
        list.push_unseparated(")");
    }

    if let Some(asymmetrical) = filter.asymmetrical {
        qb.push(" AND asymmetrical = ").push_bind(asymmetrical);
    }
    if let Some(directional) = filter.directional {
        qb.push(" AND directional = ").push_bind(directional);
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Sqlite>, sorts: &[SortKey]) {
    let sorts = if sorts.is_empty() { &DEFAULT_SORT[..] } else { sorts };
    let clauses: Vec<String> = sorts
        .iter()
        .map(|key| format!("{} {}", key.field.column(), key.order.keyword()))
        .collect();
    // Natural key last so equal sort values page deterministically
    qb.push(format!(
        " ORDER BY {}, manufacturer, model, width, aspect_ratio, wheel_diameter",
        clauses.join(", ")
    ));
}

/// Number of rows matching `filter`
pub async fn count_tires_matching(pool: &SqlitePool, filter: &TireFilter) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tires");
    push_filter(&mut qb, filter);
    let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// Rows matching `filter` in the requested order
pub async fn find_tires(
    pool: &SqlitePool,
    filter: &TireFilter,
    sorts: &[SortKey],
    window: Option<Window>,
) -> Result<Vec<TireSize>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM tires", TIRE_COLUMNS));
    push_filter(&mut qb, filter);
    push_order(&mut qb, sorts);
    if let Some(window) = window {
        qb.push(" LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);
    }

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(TireSize::from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &TireFilter) -> String {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tires");
        push_filter(&mut qb, filter);
        qb.into_sql()
    }

    #[test]
    fn test_empty_filter_has_no_conditions() {
        assert_eq!(
            sql_for(&TireFilter::default()),
            "SELECT COUNT(*) FROM tires WHERE 1 = 1"
        );
    }

    #[test]
    fn test_open_bounds_only_bind_present_side() {
        let filter = TireFilter {
            width: Bounds {
                min: Some(225),
                max: None,
            },
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("width >= ?"));
        assert!(!sql.contains("width <= ?"));
    }

    #[test]
    fn test_lists_expand_to_in_clauses() {
        let filter = TireFilter {
            manufacturers: vec!["Toyo".into(), "Dunlop".into()],
            tire_types: vec![TireType::DotRace],
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("manufacturer IN (?, ?)"));
        assert!(sql.contains("tire_type IN (?)"));
    }

    #[test]
    fn test_wheel_width_checks_both_ends() {
        let filter = TireFilter {
            wheel_width: Some(8.0),
            ..Default::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("min_wheel_width <= ? AND max_wheel_width >= ?"));
    }

    #[test]
    fn test_default_order() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1");
        push_order(&mut qb, &[]);
        assert!(qb.sql().starts_with(
            "SELECT 1 ORDER BY tire_type ASC, manufacturer ASC, model ASC, wheel_diameter ASC, width ASC"
        ));
    }

    #[test]
    fn test_sort_field_parsing() {
        assert_eq!("aspect_ratio".parse::<SortField>().unwrap(), SortField::AspectRatio);
        assert!("guid".parse::<SortField>().is_err());
        assert!("width; DROP TABLE tires".parse::<SortField>().is_err());
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("DESC".parse::<SortOrder>().is_err());
    }
}
