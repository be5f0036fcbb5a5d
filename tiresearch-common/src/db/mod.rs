//! Database models and queries

pub mod init;
pub mod models;
pub mod tires;

pub use init::*;
pub use models::*;
pub use tires::*;
