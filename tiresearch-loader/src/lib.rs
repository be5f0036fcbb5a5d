//! tiresearch-loader library
//!
//! Rebuilds the `tires` table from the catalog:
//! [`loader`] expands catalog entries into rows, [`imputer`] fills gaps from
//! grouped statistics, [`deduplicator`] merges rows sharing a size key, and
//! [`pipeline`] runs the three in one transaction.

pub mod deduplicator;
pub mod error;
pub mod imputer;
pub mod loader;
pub mod pipeline;
pub mod stats;

pub use error::LoadError;
pub use pipeline::{rebuild_catalog, PipelineReport};
