//! Read queries behind the HTTP API

pub mod search;
pub mod stats;

pub use search::{
    count_tires_matching, find_tires, Bounds, SortField, SortKey, SortOrder, TireFilter, Window,
    DEFAULT_SORT,
};
pub use stats::{list_manufacturers, tire_stats, LoadRunSummary, TireStats};
