//! Engine: the connection pool a connector draws its session from

use sqlblock_core::{BlockError, ConnectionConfig, EngineOptions};
use sqlblock_types::Dialect;
use sqlx::mysql::MySqlPool;
use sqlx::postgres::PgPool;
use sqlx::sqlite::SqlitePool;
use tracing::{debug, info};

use super::driver_error;
use super::mysql::{self, MySqlSession};
use super::postgres::{self, PostgresSession};
use super::sqlite::{self, SqliteSession};
use super::traits::Session;

/// Connection pool for one of the supported dialects
///
/// Cloning an engine is cheap and shares the underlying pool.
#[derive(Debug, Clone)]
pub enum Engine {
    Postgres(PgPool),
    Mysql(MySqlPool),
    Sqlite(SqlitePool),
}

impl Engine {
    /// Create an engine for a connection configuration
    ///
    /// No connection is opened here; the pool connects on first acquire.
    /// Must be called from within a tokio runtime.
    pub fn create(connection: &ConnectionConfig, options: &EngineOptions) -> Result<Self, BlockError> {
        options.pool.validate()?;
        let dialect = connection.driver()?.dialect();
        let url = connection.engine_url()?;

        debug!(
            "Creating {} engine for {}",
            dialect,
            connection.masked_url()
        );

        let engine = match dialect {
            Dialect::Postgresql => Engine::Postgres(postgres::create_pool(&url, &options.pool)?),
            Dialect::Mysql => Engine::Mysql(mysql::create_pool(&url, &options.pool)?),
            Dialect::Sqlite => Engine::Sqlite(sqlite::create_pool(&url, &options.pool)?),
        };

        info!("Created {} engine", dialect);
        Ok(engine)
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Engine::Postgres(_) => Dialect::Postgresql,
            Engine::Mysql(_) => Dialect::Mysql,
            Engine::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Check a connection out of the pool as a session
    pub async fn connect(&self) -> Result<Box<dyn Session>, BlockError> {
        let session: Box<dyn Session> = match self {
            Engine::Postgres(pool) => {
                Box::new(PostgresSession::new(pool.acquire().await.map_err(driver_error)?))
            }
            Engine::Mysql(pool) => {
                Box::new(MySqlSession::new(pool.acquire().await.map_err(driver_error)?))
            }
            Engine::Sqlite(pool) => {
                Box::new(SqliteSession::new(pool.acquire().await.map_err(driver_error)?))
            }
        };
        Ok(session)
    }

    /// Close the pool, waiting for checked out connections to be returned
    pub async fn dispose(&self) {
        match self {
            Engine::Postgres(pool) => pool.close().await,
            Engine::Mysql(pool) => pool.close().await,
            Engine::Sqlite(pool) => pool.close().await,
        }
        debug!("Disposed {} engine", self.dialect());
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Engine::Postgres(pool) => pool.is_closed(),
            Engine::Mysql(pool) => pool.is_closed(),
            Engine::Sqlite(pool) => pool.is_closed(),
        }
    }

    /// Number of connections currently open, idle or in use
    pub fn size(&self) -> u32 {
        match self {
            Engine::Postgres(pool) => pool.size(),
            Engine::Mysql(pool) => pool.size(),
            Engine::Sqlite(pool) => pool.size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlblock_core::ConnectionComponents;
    use sqlblock_types::Driver;

    #[tokio::test]
    async fn test_create_is_lazy() {
        let connection = ConnectionConfig::url("postgresql://user:pw@127.0.0.1:1/db").unwrap();
        let engine = Engine::create(&connection, &EngineOptions::default()).unwrap();
        assert_eq!(engine.dialect(), Dialect::Postgresql);
        assert_eq!(engine.size(), 0);
        assert!(!engine.is_closed());
    }

    #[tokio::test]
    async fn test_connect_and_dispose_sqlite() {
        let connection = ConnectionConfig::Components(
            ConnectionComponents::new(Driver::Sqlite).with_database(":memory:"),
        );
        let engine = Engine::create(&connection, &EngineOptions::default()).unwrap();

        let mut session = engine.connect().await.unwrap();
        assert_eq!(session.dialect(), Dialect::Sqlite);
        session.ping().await.unwrap();
        drop(session);

        engine.dispose().await;
        assert!(engine.is_closed());
        assert!(matches!(engine.connect().await, Err(e) if e.is_execution()));
    }

    #[tokio::test]
    async fn test_invalid_pool_config() {
        let connection = ConnectionConfig::url("sqlite://").unwrap();
        let mut options = EngineOptions::default();
        options.pool.max_connections = Some(0);
        let err = Engine::create(&connection, &options).unwrap_err();
        assert!(err.is_configuration());
    }
}
