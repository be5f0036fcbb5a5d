//! Query-string parsing shared by the search endpoints
//!
//! Parameters arrive as raw strings so that a bad value produces the JSON
//! error body instead of axum's plain-text rejection. A parameter that is
//! absent or blank leaves that criterion unconstrained. List parameters are
//! comma-separated.

use serde::Deserialize;
use std::str::FromStr;
use tiresearch_common::db::TireType;

use crate::db::{Bounds, SortField, SortKey, SortOrder, TireFilter};
use crate::error::{ApiError, ApiResult};

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Numeric query parameter type
pub trait QueryNumber: FromStr + PartialOrd + Copy {
    /// NaN and infinities parse as `f64` but bind as NULL
    fn is_finite(&self) -> bool;
}

impl QueryNumber for i64 {
    fn is_finite(&self) -> bool {
        true
    }
}

impl QueryNumber for f64 {
    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

/// Parse an optional number
pub fn parse_number<T: QueryNumber>(name: &str, raw: Option<&str>) -> ApiResult<Option<T>> {
    match present(raw) {
        None => Ok(None),
        Some(value) => match value.parse::<T>() {
            Ok(number) if number.is_finite() => Ok(Some(number)),
            _ => Err(ApiError::BadRequest(format!("Invalid {}: '{}'", name, value))),
        },
    }
}

/// Parse a min/max pair; either side may be absent but min must not exceed max
pub fn parse_bounds<T>(
    min_name: &str,
    min: Option<&str>,
    max_name: &str,
    max: Option<&str>,
) -> ApiResult<Bounds<T>>
where
    T: QueryNumber,
{
    let bounds = Bounds {
        min: parse_number::<T>(min_name, min)?,
        max: parse_number::<T>(max_name, max)?,
    };
    if let (Some(lo), Some(hi)) = (bounds.min, bounds.max) {
        if lo > hi {
            return Err(ApiError::BadRequest(format!(
                "{} must not exceed {}",
                min_name, max_name
            )));
        }
    }
    Ok(bounds)
}

/// Split a comma-separated list, dropping blank items
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    present(raw)
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn parse_tire_types(raw: Option<&str>) -> ApiResult<Vec<TireType>> {
    parse_list(raw)
        .iter()
        .map(|code| code.parse::<TireType>().map_err(ApiError::from))
        .collect()
}

/// `true`, `false`, or `any` (also absent) which matches both
pub fn parse_tri_state(name: &str, raw: Option<&str>) -> ApiResult<Option<bool>> {
    match present(raw) {
        None | Some("any") => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(ApiError::BadRequest(format!(
            "Invalid {}: '{}' (expected true, false or any)",
            name, other
        ))),
    }
}

/// Pair sort fields with orders
///
/// Without `orders` every field sorts ascending; otherwise both lists must
/// have the same length.
pub fn parse_sorts(sorts: Option<&str>, orders: Option<&str>) -> ApiResult<Vec<SortKey>> {
    let fields = parse_list(sorts);
    let orders = parse_list(orders);

    if !orders.is_empty() && orders.len() != fields.len() {
        return Err(ApiError::BadRequest(format!(
            "sorts and orders differ in length ({} vs {})",
            fields.len(),
            orders.len()
        )));
    }

    fields
        .iter()
        .enumerate()
        .map(|(i, field)| -> ApiResult<SortKey> {
            let field = field.parse::<SortField>()?;
            let order = match orders.get(i) {
                Some(order) => order.parse::<SortOrder>()?,
                None => SortOrder::Asc,
            };
            Ok(SortKey { field, order })
        })
        .collect()
}

/// Requested page, 1 when absent
pub fn parse_page(raw: Option<&str>) -> ApiResult<i64> {
    Ok(parse_number::<i64>("page", raw)?.unwrap_or(1))
}

/// Filters every search form has in common
#[derive(Debug, Default, Deserialize)]
pub struct SharedFilters {
    pub brands: Option<String>,
    pub tire_types: Option<String>,
    pub min_tire_weight: Option<String>,
    pub max_tire_weight: Option<String>,
    pub asymmetrical: Option<String>,
    pub directional: Option<String>,
    pub sorts: Option<String>,
    pub orders: Option<String>,
}

impl SharedFilters {
    /// Base filter carrying the shared criteria
    pub fn to_filter(&self) -> ApiResult<TireFilter> {
        Ok(TireFilter {
            manufacturers: parse_list(self.brands.as_deref()),
            tire_types: parse_tire_types(self.tire_types.as_deref())?,
            weight: parse_bounds(
                "min_tire_weight",
                self.min_tire_weight.as_deref(),
                "max_tire_weight",
                self.max_tire_weight.as_deref(),
            )?,
            asymmetrical: parse_tri_state("asymmetrical", self.asymmetrical.as_deref())?,
            directional: parse_tri_state("directional", self.directional.as_deref())?,
            ..Default::default()
        })
    }

    pub fn sort_keys(&self) -> ApiResult<Vec<SortKey>> {
        parse_sorts(self.sorts.as_deref(), self.orders.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_unconstrained() {
        assert_eq!(parse_number::<i64>("width", Some("  ")).unwrap(), None);
        assert_eq!(parse_number::<i64>("width", None).unwrap(), None);
        assert_eq!(parse_number::<f64>("weight", Some("22.5")).unwrap(), Some(22.5));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        assert!(matches!(
            parse_number::<i64>("width", Some("wide")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        for raw in ["NaN", "nan", "inf", "-infinity"] {
            assert!(matches!(
                parse_number::<f64>("min_tire_weight", Some(raw)),
                Err(ApiError::BadRequest(_))
            ));
        }
        assert!(matches!(
            parse_bounds::<f64>("min_tire_weight", Some("NaN"), "max_tire_weight", Some("40")),
            Err(ApiError::BadRequest(_))
        ));
        assert_eq!(parse_number::<f64>("weight", Some("1e1")).unwrap(), Some(10.0));
    }

    #[test]
    fn test_bounds() {
        let b = parse_bounds::<i64>("min", Some("225"), "max", None).unwrap();
        assert_eq!(b.min, Some(225));
        assert_eq!(b.max, None);
        assert!(parse_bounds::<i64>("min", Some("300"), "max", Some("200")).is_err());
        assert!(parse_bounds::<f64>("min", Some("25"), "max", Some("25")).is_ok());
    }

    #[test]
    fn test_list() {
        assert_eq!(parse_list(Some("Toyo, Dunlop,,")), vec!["Toyo", "Dunlop"]);
        assert!(parse_list(Some("")).is_empty());
    }

    #[test]
    fn test_tire_types() {
        assert_eq!(
            parse_tire_types(Some("0dotr,6w")).unwrap(),
            vec![TireType::DotRace, TireType::Winter]
        );
        assert!(matches!(
            parse_tire_types(Some("2s,7x")),
            Err(ApiError::Common(tiresearch_common::Error::InvalidInput(_)))
        ));
    }

    #[test]
    fn test_tri_state() {
        assert_eq!(parse_tri_state("a", Some("any")).unwrap(), None);
        assert_eq!(parse_tri_state("a", None).unwrap(), None);
        assert_eq!(parse_tri_state("a", Some("true")).unwrap(), Some(true));
        assert_eq!(parse_tri_state("a", Some("false")).unwrap(), Some(false));
        assert!(parse_tri_state("a", Some("maybe")).is_err());
    }

    #[test]
    fn test_sorts() {
        let keys = parse_sorts(Some("weight,width"), Some("desc,asc")).unwrap();
        assert_eq!(
            keys,
            vec![
                SortKey {
                    field: SortField::Weight,
                    order: SortOrder::Desc
                },
                SortKey {
                    field: SortField::Width,
                    order: SortOrder::Asc
                },
            ]
        );
        assert_eq!(parse_sorts(Some("model"), None).unwrap()[0].order, SortOrder::Asc);
        assert!(parse_sorts(Some("weight,width"), Some("desc")).is_err());
        assert!(parse_sorts(Some("guid"), None).is_err());
        assert!(parse_sorts(Some("weight"), Some("sideways")).is_err());
        assert!(parse_sorts(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_page() {
        assert_eq!(parse_page(None).unwrap(), 1);
        assert_eq!(parse_page(Some("3")).unwrap(), 3);
        assert!(parse_page(Some("three")).is_err());
    }
}
