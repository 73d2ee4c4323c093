//! Type definitions for sqlblock
//!
//! This crate contains the closed driver table and the SQL dialects it maps
//! onto. It has no knowledge of connections or engines.

pub mod dialect;
pub mod driver;

pub use dialect::Dialect;
pub use driver::{Driver, DriverSpec};
