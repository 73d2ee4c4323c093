//! Connector runtime for sqlblock
//!
//! This crate provides the engines and sessions over sqlx, statement
//! parameter binding, the cursor cache, and the two connector surfaces:
//! [`AsyncConnector`] for async drivers and the blocking [`Connector`].

mod blocking;
mod connector;
pub mod connectors;
pub mod cursor;
pub mod executor;
pub mod tasks;

pub use blocking::{Connector, ConnectorGuard};
pub use connector::AsyncConnector;
pub use connectors::{Engine, Session};
pub use cursor::{CursorCache, StatementKey};
