//! Engine options and persisted connector settings

use serde::{Deserialize, Serialize};
use sqlblock_types::Driver;
use std::time::Duration;

use super::ConnectionConfig;
use crate::error::{BlockError, Result};

/// Page size used by `fetch_many` when no size is given
pub const DEFAULT_FETCH_SIZE: usize = 1;

/// Connection pool configuration for the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool (default: 5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,

    /// Minimum number of connections to maintain (default: 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_connections: Option<u32>,

    /// Connection acquire timeout in seconds (default: 30)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acquire_timeout_secs: Option<u64>,

    /// Idle connection timeout in seconds (default: 600)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,

    /// Maximum lifetime of a connection in seconds (default: 1800)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lifetime_secs: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: Some(5),
            min_connections: Some(0),
            acquire_timeout_secs: Some(30),
            idle_timeout_secs: Some(600),
            max_lifetime_secs: Some(1800),
        }
    }
}

impl PoolConfig {
    /// Get max connections with default fallback
    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(5)
    }

    /// Get min connections with default fallback
    pub fn min_connections(&self) -> u32 {
        self.min_connections.unwrap_or(0)
    }

    /// Get acquire timeout with default fallback
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs.unwrap_or(30))
    }

    /// Get idle timeout with default fallback
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.unwrap_or(600))
    }

    /// Get max lifetime with default fallback
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs.unwrap_or(1800))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_connections() == 0 {
            return Err(BlockError::Configuration(
                "Pool max_connections must be at least 1".to_string(),
            ));
        }
        if self.min_connections() > self.max_connections() {
            return Err(BlockError::Configuration(format!(
                "Pool min_connections ({}) exceeds max_connections ({})",
                self.min_connections(),
                self.max_connections()
            )));
        }
        Ok(())
    }
}

/// Options applied when the engine is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Pool settings passed to the backend
    #[serde(default)]
    pub pool: PoolConfig,

    /// Log every statement at INFO level
    #[serde(default)]
    pub echo: bool,

    /// Transactional sessions: statements run inside an implicit transaction
    /// that persists only on `commit()`. Otherwise every statement autocommits.
    #[serde(default)]
    pub future: bool,
}

impl EngineOptions {
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_future(mut self, future: bool) -> Self {
        self.future = future;
        self
    }
}

fn default_fetch_size() -> usize {
    DEFAULT_FETCH_SIZE
}

/// Everything a connector block persists: no live engine or session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSettings {
    /// Where and how to connect
    pub connection: ConnectionConfig,

    /// Engine creation options
    #[serde(default)]
    pub engine: EngineOptions,

    /// Default page size for `fetch_many`
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

impl ConnectorSettings {
    pub fn new(connection: impl Into<ConnectionConfig>) -> Self {
        Self {
            connection: connection.into(),
            engine: EngineOptions::default(),
            fetch_size: DEFAULT_FETCH_SIZE,
        }
    }

    pub fn with_engine_options(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// Driver fixed by the connection configuration
    pub fn driver(&self) -> Result<Driver> {
        self.connection.driver()
    }

    /// Validate everything that can be checked without I/O
    pub fn validate(&self) -> Result<()> {
        self.connection.validate()?;
        self.engine.pool.validate()?;
        if self.fetch_size == 0 {
            return Err(BlockError::Configuration(
                "fetch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConnectionComponents;

    #[test]
    fn test_pool_config_default() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections(), 5);
        assert_eq!(config.min_connections(), 0);
        assert_eq!(config.acquire_timeout().as_secs(), 30);
        assert_eq!(config.idle_timeout().as_secs(), 600);
        assert_eq!(config.max_lifetime().as_secs(), 1800);
    }

    #[test]
    fn test_pool_config_validation() {
        let config = PoolConfig {
            max_connections: Some(2),
            min_connections: Some(3),
            ..PoolConfig::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());

        let config = PoolConfig {
            max_connections: Some(0),
            ..PoolConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_settings_defaults_on_deserialize() {
        let json = r#"{"connection":{"connection_string":"sqlite+async://"}}"#;
        let settings: ConnectorSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.fetch_size, DEFAULT_FETCH_SIZE);
        assert_eq!(settings.engine, EngineOptions::default());
        assert_eq!(settings.driver().unwrap(), Driver::SqliteAsync);
    }

    #[test]
    fn test_settings_validation() {
        let settings = ConnectorSettings::new(
            ConnectionComponents::new(Driver::Sqlite).with_database(":memory:"),
        );
        assert!(settings.validate().is_ok());
        assert!(settings.with_fetch_size(0).validate().is_err());
    }

    #[test]
    fn test_engine_options_serde() {
        let options = EngineOptions::default().with_echo(true).with_future(true);
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains("\"echo\":true"));
        let parsed: EngineOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
