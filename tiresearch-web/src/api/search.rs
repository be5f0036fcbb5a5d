//! Tire search endpoints
//!
//! Four search forms plus the landing search. All of them accept the shared
//! filters (brands, tire_types, min/max_tire_weight, asymmetrical,
//! directional, sorts, orders) on top of their own size criteria.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tiresearch_common::db::TireSize;
use tracing::debug;

use super::options::{
    DEFAULT_MAX_TIRE_DIAMETER, DEFAULT_MAX_TIRE_WEIGHT, DEFAULT_MAX_TIRE_WIDTH,
    DEFAULT_MIN_TIRE_DIAMETER, DEFAULT_MIN_TIRE_WEIGHT, DEFAULT_MIN_TIRE_WIDTH,
    DEFAULT_WHEEL_DIAMETER,
};
use super::params::{parse_bounds, parse_number, parse_page, SharedFilters};
use crate::db::{count_tires_matching, find_tires, Bounds, SortKey, TireFilter, DEFAULT_SORT};
use crate::error::ApiResult;
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

/// Front tires must be within this many inches of the rear's overall diameter
pub const STAGGERED_DIAMETER_TOLERANCE: f64 = 0.2;
/// Absorbs float error at the window edges
const DIAMETER_EPSILON: f64 = 1e-6;

/// A tire as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct TireView {
    #[serde(flatten)]
    pub tire: TireSize,
    pub tire_code: String,
    pub wheel_width_range: String,
    pub tire_type_label: &'static str,
}

impl From<TireSize> for TireView {
    fn from(tire: TireSize) -> Self {
        Self {
            tire_code: tire.tire_code(),
            wheel_width_range: tire.wheel_width_range(),
            tire_type_label: tire.tire_type.label(),
            tire,
        }
    }
}

/// Paginated search result
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub total_results: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub tires: Vec<TireView>,
}

async fn paged_search(
    state: &AppState,
    filter: &TireFilter,
    sorts: &[SortKey],
    requested_page: i64,
) -> ApiResult<Json<SearchResponse>> {
    let total_results = count_tires_matching(&state.db, filter).await?;
    let pagination = calculate_pagination(total_results, requested_page);
    let tires = find_tires(&state.db, filter, sorts, Some(pagination.window())).await?;

    debug!(total_results, page = pagination.page, "Search complete");

    Ok(Json(SearchResponse {
        total_results,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        tires: tires.into_iter().map(TireView::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DefaultSearchQuery {
    pub page: Option<String>,
}

/// GET /
///
/// Landing search with the form defaults.
pub async fn default_search(
    State(state): State<AppState>,
    Query(query): Query<DefaultSearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let filter = TireFilter {
        width: Bounds::between(DEFAULT_MIN_TIRE_WIDTH, DEFAULT_MAX_TIRE_WIDTH),
        wheel_diameter: Bounds::exactly(DEFAULT_WHEEL_DIAMETER),
        tire_diameter: Bounds::between(DEFAULT_MIN_TIRE_DIAMETER, DEFAULT_MAX_TIRE_DIAMETER),
        weight: Bounds::between(DEFAULT_MIN_TIRE_WEIGHT, DEFAULT_MAX_TIRE_WEIGHT),
        ..Default::default()
    };
    paged_search(&state, &filter, &DEFAULT_SORT, parse_page(query.page.as_deref())?).await
}

#[derive(Debug, Deserialize)]
pub struct StandardSearchQuery {
    #[serde(flatten)]
    pub shared: SharedFilters,
    pub min_tire_width: Option<String>,
    pub max_tire_width: Option<String>,
    pub wheel_diameter: Option<String>,
    pub min_tire_diameter: Option<String>,
    pub max_tire_diameter: Option<String>,
    pub page: Option<String>,
}

/// GET /standard_search
pub async fn standard_search(
    State(state): State<AppState>,
    Query(query): Query<StandardSearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let mut filter = query.shared.to_filter()?;
    filter.width = parse_bounds(
        "min_tire_width",
        query.min_tire_width.as_deref(),
        "max_tire_width",
        query.max_tire_width.as_deref(),
    )?;
    filter.wheel_diameter = exact("wheel_diameter", query.wheel_diameter.as_deref())?;
    filter.tire_diameter = parse_bounds(
        "min_tire_diameter",
        query.min_tire_diameter.as_deref(),
        "max_tire_diameter",
        query.max_tire_diameter.as_deref(),
    )?;

    let sorts = query.shared.sort_keys()?;
    paged_search(&state, &filter, &sorts, parse_page(query.page.as_deref())?).await
}

#[derive(Debug, Deserialize)]
pub struct WheelSearchQuery {
    #[serde(flatten)]
    pub shared: SharedFilters,
    pub wheel_width: Option<String>,
    pub wheel_diameter: Option<String>,
    pub min_tire_diameter: Option<String>,
    pub max_tire_diameter: Option<String>,
    pub page: Option<String>,
}

/// GET /wheel_search
///
/// Tires whose compatible rim range contains `wheel_width`.
pub async fn wheel_search(
    State(state): State<AppState>,
    Query(query): Query<WheelSearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let mut filter = query.shared.to_filter()?;
    filter.wheel_width = parse_number("wheel_width", query.wheel_width.as_deref())?;
    filter.wheel_diameter = exact("wheel_diameter", query.wheel_diameter.as_deref())?;
    filter.tire_diameter = parse_bounds(
        "min_tire_diameter",
        query.min_tire_diameter.as_deref(),
        "max_tire_diameter",
        query.max_tire_diameter.as_deref(),
    )?;

    let sorts = query.shared.sort_keys()?;
    paged_search(&state, &filter, &sorts, parse_page(query.page.as_deref())?).await
}

#[derive(Debug, Deserialize)]
pub struct HardcoreSearchQuery {
    #[serde(flatten)]
    pub shared: SharedFilters,
    pub min_tire_width: Option<String>,
    pub max_tire_width: Option<String>,
    pub min_ar: Option<String>,
    pub max_ar: Option<String>,
    pub min_wheel_diameter: Option<String>,
    pub max_wheel_diameter: Option<String>,
    pub min_tire_diameter: Option<String>,
    pub max_tire_diameter: Option<String>,
    pub page: Option<String>,
}

/// GET /hardcore_search
pub async fn hardcore_search(
    State(state): State<AppState>,
    Query(query): Query<HardcoreSearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let mut filter = query.shared.to_filter()?;
    filter.width = parse_bounds(
        "min_tire_width",
        query.min_tire_width.as_deref(),
        "max_tire_width",
        query.max_tire_width.as_deref(),
    )?;
    filter.aspect_ratio = parse_bounds(
        "min_ar",
        query.min_ar.as_deref(),
        "max_ar",
        query.max_ar.as_deref(),
    )?;
    filter.wheel_diameter = parse_bounds(
        "min_wheel_diameter",
        query.min_wheel_diameter.as_deref(),
        "max_wheel_diameter",
        query.max_wheel_diameter.as_deref(),
    )?;
    filter.tire_diameter = parse_bounds(
        "min_tire_diameter",
        query.min_tire_diameter.as_deref(),
        "max_tire_diameter",
        query.max_tire_diameter.as_deref(),
    )?;

    let sorts = query.shared.sort_keys()?;
    paged_search(&state, &filter, &sorts, parse_page(query.page.as_deref())?).await
}

#[derive(Debug, Deserialize)]
pub struct StaggeredSearchQuery {
    #[serde(flatten)]
    pub shared: SharedFilters,
    pub min_rear_tire_width: Option<String>,
    pub max_rear_tire_width: Option<String>,
    pub min_front_tire_width: Option<String>,
    pub max_front_tire_width: Option<String>,
    pub rear_wheel_diameter: Option<String>,
    pub front_wheel_diameter: Option<String>,
}

/// A rear size and the same model's front sizes that match its diameter
#[derive(Debug, Serialize)]
pub struct StaggeredPair {
    pub rear: TireView,
    pub fronts: Vec<TireView>,
}

/// Overall-diameter window a front tire must fall in
pub fn staggered_window(rear_tire_diameter: f64) -> Bounds<f64> {
    Bounds::between(
        rear_tire_diameter - STAGGERED_DIAMETER_TOLERANCE - DIAMETER_EPSILON,
        rear_tire_diameter + STAGGERED_DIAMETER_TOLERANCE + DIAMETER_EPSILON,
    )
}

/// GET /staggered_search
///
/// Only rears with at least one matching front are returned.
pub async fn staggered_search(
    State(state): State<AppState>,
    Query(query): Query<StaggeredSearchQuery>,
) -> ApiResult<Json<Vec<StaggeredPair>>> {
    let base = query.shared.to_filter()?;
    let sorts = query.shared.sort_keys()?;

    let rear_filter = TireFilter {
        width: parse_bounds(
            "min_rear_tire_width",
            query.min_rear_tire_width.as_deref(),
            "max_rear_tire_width",
            query.max_rear_tire_width.as_deref(),
        )?,
        wheel_diameter: exact("rear_wheel_diameter", query.rear_wheel_diameter.as_deref())?,
        ..base.clone()
    };
    let front_width = parse_bounds(
        "min_front_tire_width",
        query.min_front_tire_width.as_deref(),
        "max_front_tire_width",
        query.max_front_tire_width.as_deref(),
    )?;
    let front_wheel_diameter =
        exact("front_wheel_diameter", query.front_wheel_diameter.as_deref())?;

    let rears = find_tires(&state.db, &rear_filter, &sorts, None).await?;

    let mut pairs = Vec::new();
    for rear in rears {
        let Some(rear_diameter) = rear.tire_diameter else {
            continue;
        };

        let front_filter = TireFilter {
            manufacturers: vec![rear.manufacturer.clone()],
            model: Some(rear.model.clone()),
            width: front_width,
            wheel_diameter: front_wheel_diameter,
            tire_diameter: staggered_window(rear_diameter),
            ..base.clone()
        };
        let fronts = find_tires(&state.db, &front_filter, &sorts, None).await?;

        if !fronts.is_empty() {
            pairs.push(StaggeredPair {
                rear: rear.into(),
                fronts: fronts.into_iter().map(TireView::from).collect(),
            });
        }
    }

    debug!(pairs = pairs.len(), "Staggered search complete");
    Ok(Json(pairs))
}

/// Single-value parameter matched exactly
fn exact(name: &str, raw: Option<&str>) -> ApiResult<Bounds<f64>> {
    Ok(match parse_number::<f64>(name, raw)? {
        Some(value) => Bounds::exactly(value),
        None => Bounds::default(),
    })
}
