//! sqlblock CLI
//!
//! This crate provides the command-line interface for sqlblock including:
//! - save: Save a connection block
//! - show: Show a saved block with its password masked
//! - list: List saved blocks
//! - delete: Delete a saved block
//! - execute: Run a statement through a block
//! - query: Run a query through a block and print its rows as JSON

pub mod commands;

pub use commands::{Cli, Commands};
