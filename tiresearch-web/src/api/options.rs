//! Search form bounds and defaults
//!
//! Clients build their search forms from `GET /search_options`; the same
//! defaults drive the landing search at `GET /`.

use axum::{extract::State, Json};
use serde::Serialize;
use tiresearch_common::db::TireType;

use crate::db::{list_manufacturers, SortField, SortOrder, DEFAULT_SORT};
use crate::error::ApiResult;
use crate::AppState;

pub const MIN_TIRE_WIDTH: i64 = 145;
pub const MAX_TIRE_WIDTH: i64 = 395;
pub const DEFAULT_MIN_TIRE_WIDTH: i64 = 225;
pub const DEFAULT_MAX_TIRE_WIDTH: i64 = 295;
pub const DEFAULT_MIN_REAR_TIRE_WIDTH: i64 = 255;
pub const DEFAULT_MAX_REAR_TIRE_WIDTH: i64 = 285;
pub const DEFAULT_MIN_FRONT_TIRE_WIDTH: i64 = 215;
pub const DEFAULT_MAX_FRONT_TIRE_WIDTH: i64 = 245;

pub const MIN_TIRE_AR: i64 = 15;
pub const MAX_TIRE_AR: i64 = 85;
pub const DEFAULT_MIN_TIRE_AR: i64 = 20;
pub const DEFAULT_MAX_TIRE_AR: i64 = 65;

pub const MIN_WHEEL_DIAMETER: f64 = 13.0;
pub const MAX_WHEEL_DIAMETER: f64 = 26.0;
pub const DEFAULT_WHEEL_DIAMETER: f64 = 17.0;
pub const DEFAULT_REAR_WHEEL_DIAMETER: f64 = 19.0;
pub const DEFAULT_FRONT_WHEEL_DIAMETER: f64 = 18.0;
pub const DEFAULT_MIN_WHEEL_DIAMETER: f64 = 16.0;
pub const DEFAULT_MAX_WHEEL_DIAMETER: f64 = 19.0;

pub const MIN_WHEEL_WIDTH: f64 = 4.5;
pub const MAX_WHEEL_WIDTH: f64 = 13.5;
pub const DEFAULT_WHEEL_WIDTH: f64 = 8.0;

pub const MIN_TIRE_DIAMETER: f64 = 19.0;
pub const MAX_TIRE_DIAMETER: f64 = 34.0;
pub const DEFAULT_MIN_TIRE_DIAMETER: f64 = 20.0;
pub const DEFAULT_MAX_TIRE_DIAMETER: f64 = 32.0;

pub const MIN_TIRE_WEIGHT: f64 = 10.0;
pub const MAX_TIRE_WEIGHT: f64 = 50.0;
pub const DEFAULT_MIN_TIRE_WEIGHT: f64 = 15.0;
pub const DEFAULT_MAX_TIRE_WEIGHT: f64 = 40.0;

pub const MIN_TIRE_TREADWEAR: i64 = 10;
pub const MAX_TIRE_TREADWEAR: i64 = 400;

/// Slider bounds with a default selection
#[derive(Debug, Serialize)]
pub struct RangeOption<T> {
    pub min: T,
    pub max: T,
    pub default_min: T,
    pub default_max: T,
}

#[derive(Debug, Serialize)]
pub struct WheelDiameterOption {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub default_rear: f64,
    pub default_front: f64,
    pub default_min: f64,
    pub default_max: f64,
}

#[derive(Debug, Serialize)]
pub struct WheelWidthOption {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

#[derive(Debug, Serialize)]
pub struct TreadwearOption {
    pub min: i64,
    pub max: i64,
}

/// One entry of a select box
#[derive(Debug, Serialize)]
pub struct Choice {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TireTypeOption {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DefaultSort {
    pub sort: &'static str,
    pub order: String,
}

#[derive(Debug, Serialize)]
pub struct SearchOptions {
    pub tire_width: RangeOption<i64>,
    pub rear_tire_width: RangeOption<i64>,
    pub front_tire_width: RangeOption<i64>,
    pub aspect_ratio: RangeOption<i64>,
    pub wheel_diameter: WheelDiameterOption,
    pub wheel_width: WheelWidthOption,
    pub tire_diameter: RangeOption<f64>,
    pub tire_weight: RangeOption<f64>,
    pub treadwear: TreadwearOption,
    pub asymmetrical: Vec<Choice>,
    pub default_asymmetrical: &'static str,
    pub directional: Vec<Choice>,
    pub default_directional: &'static str,
    pub sorts: Vec<Choice>,
    pub orders: Vec<Choice>,
    pub default_sorts: Vec<DefaultSort>,
    pub tire_types: Vec<TireTypeOption>,
    pub brands: Vec<String>,
}

fn tri_state_choices() -> Vec<Choice> {
    vec![
        Choice {
            label: "Yes",
            value: "true",
        },
        Choice {
            label: "No",
            value: "false",
        },
        Choice {
            label: "Any",
            value: "any",
        },
    ]
}

/// Everything except the brand list, which comes from the database
pub fn static_options() -> SearchOptions {
    SearchOptions {
        tire_width: RangeOption {
            min: MIN_TIRE_WIDTH,
            max: MAX_TIRE_WIDTH,
            default_min: DEFAULT_MIN_TIRE_WIDTH,
            default_max: DEFAULT_MAX_TIRE_WIDTH,
        },
        rear_tire_width: RangeOption {
            min: MIN_TIRE_WIDTH,
            max: MAX_TIRE_WIDTH,
            default_min: DEFAULT_MIN_REAR_TIRE_WIDTH,
            default_max: DEFAULT_MAX_REAR_TIRE_WIDTH,
        },
        front_tire_width: RangeOption {
            min: MIN_TIRE_WIDTH,
            max: MAX_TIRE_WIDTH,
            default_min: DEFAULT_MIN_FRONT_TIRE_WIDTH,
            default_max: DEFAULT_MAX_FRONT_TIRE_WIDTH,
        },
        aspect_ratio: RangeOption {
            min: MIN_TIRE_AR,
            max: MAX_TIRE_AR,
            default_min: DEFAULT_MIN_TIRE_AR,
            default_max: DEFAULT_MAX_TIRE_AR,
        },
        wheel_diameter: WheelDiameterOption {
            min: MIN_WHEEL_DIAMETER,
            max: MAX_WHEEL_DIAMETER,
            default: DEFAULT_WHEEL_DIAMETER,
            default_rear: DEFAULT_REAR_WHEEL_DIAMETER,
            default_front: DEFAULT_FRONT_WHEEL_DIAMETER,
            default_min: DEFAULT_MIN_WHEEL_DIAMETER,
            default_max: DEFAULT_MAX_WHEEL_DIAMETER,
        },
        wheel_width: WheelWidthOption {
            min: MIN_WHEEL_WIDTH,
            max: MAX_WHEEL_WIDTH,
            default: DEFAULT_WHEEL_WIDTH,
        },
        tire_diameter: RangeOption {
            min: MIN_TIRE_DIAMETER,
            max: MAX_TIRE_DIAMETER,
            default_min: DEFAULT_MIN_TIRE_DIAMETER,
            default_max: DEFAULT_MAX_TIRE_DIAMETER,
        },
        tire_weight: RangeOption {
            min: MIN_TIRE_WEIGHT,
            max: MAX_TIRE_WEIGHT,
            default_min: DEFAULT_MIN_TIRE_WEIGHT,
            default_max: DEFAULT_MAX_TIRE_WEIGHT,
        },
        treadwear: TreadwearOption {
            min: MIN_TIRE_TREADWEAR,
            max: MAX_TIRE_TREADWEAR,
        },
        asymmetrical: tri_state_choices(),
        default_asymmetrical: "any",
        directional: tri_state_choices(),
        default_directional: "any",
        sorts: SortField::ALL
            .iter()
            .map(|f| Choice {
                label: f.label(),
                value: f.column(),
            })
            .collect(),
        orders: [SortOrder::Asc, SortOrder::Desc]
            .iter()
            .map(|o| Choice {
                label: o.label(),
                value: match o {
                    SortOrder::Asc => "asc",
                    SortOrder::Desc => "desc",
                },
            })
            .collect(),
        default_sorts: DEFAULT_SORT
            .iter()
            .map(|k| DefaultSort {
                sort: k.field.column(),
                order: k.order.to_string(),
            })
            .collect(),
        tire_types: TireType::ALL
            .iter()
            .map(|t| TireTypeOption {
                code: t.code(),
                label: t.label(),
            })
            .collect(),
        brands: Vec::new(),
    }
}

/// GET /search_options
pub async fn search_options(State(state): State<AppState>) -> ApiResult<Json<SearchOptions>> {
    let mut options = static_options();
    options.brands = list_manufacturers(&state.db).await?;
    Ok(Json(options))
}
