//! HTTP API handlers for tiresearch-web

pub mod admin;
pub mod health;
pub mod options;
pub mod params;
pub mod search;

pub use admin::{get_tire_stats, reload_catalog, require_localhost};
pub use health::health_routes;
pub use options::search_options;
pub use search::{default_search, hardcore_search, staggered_search, standard_search, wheel_search};
