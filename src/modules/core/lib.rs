//! Core domain logic for sqlblock
//!
//! This crate contains the connection configuration model, engine options,
//! bind parameters, result rows and the error taxonomy shared by the store
//! and runtime crates.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{BlockError, Result};
