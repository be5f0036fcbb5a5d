//! # Tire Search Common Library
//!
//! Shared code for the tire search loader and web service:
//! - Database initialization and the `tires` schema
//! - `TireSize` / `TireType` models
//! - Catalog (tire data source) definitions
//! - Configuration loading
//! - Common error type

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
