//! PostgreSQL session implementation

use async_trait::async_trait;
use serde_json::Value;
use sqlblock_core::{BlockError, CursorResult, PoolConfig};
use sqlblock_types::Dialect;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Connection, Executor, Postgres};

use super::driver_error;
use super::traits::Session;

/// Create a lazily connecting PostgreSQL pool
pub(crate) fn create_pool(url: &str, config: &PoolConfig) -> Result<PgPool, BlockError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections())
        .min_connections(config.min_connections())
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect_lazy(url)
        .map_err(driver_error)
}

/// PostgreSQL session holding one pooled connection
pub struct PostgresSession {
    conn: PoolConnection<Postgres>,
}

impl PostgresSession {
    pub fn new(conn: PoolConnection<Postgres>) -> Self {
        Self { conn }
    }

    /// Convert a PostgreSQL row to values in column order
    fn row_values(row: &PgRow) -> Vec<Value> {
        use sqlx::Row;

        row.columns()
            .iter()
            .map(|column| Self::get_column_value(row, column))
            .collect()
    }

    /// Get a column value as a JSON value
    fn get_column_value(row: &PgRow, column: &sqlx::postgres::PgColumn) -> Value {
        use sqlx::{Column, Row, TypeInfo};

        let type_name = column.type_info().name();
        let idx = column.ordinal();

        match type_name {
            "BOOL" => row
                .try_get::<bool, _>(idx)
                .map(Value::Bool)
                .unwrap_or(Value::Null),
            "INT2" => row
                .try_get::<i16, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "INT4" => row
                .try_get::<i32, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "INT8" => row
                .try_get::<i64, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "FLOAT4" => row
                .try_get::<f32, _>(idx)
                .map(|v| {
                    serde_json::Number::from_f64(v as f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                })
                .unwrap_or(Value::Null),
            "FLOAT8" => row
                .try_get::<f64, _>(idx)
                .map(|v| {
                    serde_json::Number::from_f64(v)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                })
                .unwrap_or(Value::Null),
            "UUID" => row
                .try_get::<uuid::Uuid, _>(idx)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null),
            "TIMESTAMPTZ" => row
                .try_get::<chrono::DateTime<chrono::Utc>, _>(idx)
                .map(|v| Value::String(v.to_rfc3339()))
                .unwrap_or(Value::Null),
            "TIMESTAMP" => row
                .try_get::<chrono::NaiveDateTime, _>(idx)
                .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
                .unwrap_or(Value::Null),
            "DATE" => row
                .try_get::<chrono::NaiveDate, _>(idx)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null),
            "TIME" => row
                .try_get::<chrono::NaiveTime, _>(idx)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null),
            "JSON" | "JSONB" => row.try_get::<Value, _>(idx).unwrap_or(Value::Null),
            "BYTEA" => row
                .try_get::<Vec<u8>, _>(idx)
                .map(|v| Value::Array(v.into_iter().map(Value::from).collect()))
                .unwrap_or(Value::Null),
            _ => row
                .try_get::<String, _>(idx)
                .map(Value::String)
                .unwrap_or(Value::Null),
        }
    }
}

#[async_trait]
impl Session for PostgresSession {
    async fn execute(
        &mut self,
        statement: &str,
        binds: Option<Vec<Value>>,
    ) -> Result<CursorResult, BlockError> {
        let stream = match binds {
            Some(values) => {
                let query = bind_values!(sqlx::query(statement), values);
                (&mut *self.conn).fetch_many(query)
            }
            None => (&mut *self.conn).fetch_many(statement),
        };
        collect_results!(stream, Self::row_values)
    }

    async fn ping(&mut self) -> Result<(), BlockError> {
        self.conn.ping().await.map_err(driver_error)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgresql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_is_lazy() {
        // Nothing listens here; a lazy pool must not try to connect
        let pool = create_pool("postgres://nobody@127.0.0.1:1/none", &PoolConfig::default());
        assert!(pool.is_ok());
        assert_eq!(pool.unwrap().size(), 0);
    }

    #[tokio::test]
    async fn test_create_pool_rejects_malformed_url() {
        let err = create_pool("postgres://user@host:notaport/db", &PoolConfig::default())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    #[ignore] // Requires a running PostgreSQL instance
    async fn test_postgres_session() {
        let pool = create_pool("postgres://localhost/test", &PoolConfig::default()).unwrap();
        let mut session = PostgresSession::new(pool.acquire().await.unwrap());
        let mut result = session
            .execute("SELECT $1::int4 AS n", Some(vec![serde_json::json!(7)]))
            .await
            .unwrap();
        assert_eq!(result.fetch_one().unwrap().get("n"), Some(&serde_json::json!(7)));
    }

    #[tokio::test]
    #[ignore] // Requires a running PostgreSQL instance
    async fn test_null_binds_as_text() {
        let pool = create_pool("postgres://localhost/test", &PoolConfig::default()).unwrap();
        let mut session = PostgresSession::new(pool.acquire().await.unwrap());
        session
            .execute("CREATE TEMPORARY TABLE counts (n INTEGER)", None)
            .await
            .unwrap();

        let untyped = session
            .execute("INSERT INTO counts (n) VALUES ($1)", Some(vec![Value::Null]))
            .await;
        assert!(matches!(untyped, Err(e) if e.is_execution()));

        let result = session
            .execute("INSERT INTO counts (n) VALUES ($1::int4)", Some(vec![Value::Null]))
            .await
            .unwrap();
        assert_eq!(result.rows_affected(), 1);
    }
}
