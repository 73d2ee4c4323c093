//! Domain models for sqlblock configuration and results

mod connection;
mod options;
mod params;
mod result;

pub use connection::{mask_url, ConnectionComponents, ConnectionConfig};
pub use options::{ConnectorSettings, EngineOptions, PoolConfig, DEFAULT_FETCH_SIZE};
pub use params::Parameters;
pub use result::{CursorResult, Row};
