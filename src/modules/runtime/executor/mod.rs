//! Statement preparation
//!
//! Turns a statement and its parameters into what a session executes.

mod binder;

pub use binder::{bind_parameters, BoundStatement};
