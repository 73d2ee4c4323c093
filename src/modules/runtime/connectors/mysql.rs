//! MySQL session implementation

use async_trait::async_trait;
use serde_json::Value;
use sqlblock_core::{BlockError, CursorResult, PoolConfig};
use sqlblock_types::Dialect;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, Executor, MySql};

use super::driver_error;
use super::traits::Session;

/// Create a lazily connecting MySQL pool
pub(crate) fn create_pool(url: &str, config: &PoolConfig) -> Result<MySqlPool, BlockError> {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections())
        .min_connections(config.min_connections())
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect_lazy(url)
        .map_err(driver_error)
}

/// MySQL session holding one pooled connection
pub struct MySqlSession {
    conn: PoolConnection<MySql>,
}

impl MySqlSession {
    pub fn new(conn: PoolConnection<MySql>) -> Self {
        Self { conn }
    }

    /// Convert a MySQL row to values in column order
    fn row_values(row: &MySqlRow) -> Vec<Value> {
        use sqlx::Row;

        row.columns()
            .iter()
            .map(|column| Self::get_column_value(row, column))
            .collect()
    }

    /// Get a column value as a JSON value
    fn get_column_value(row: &MySqlRow, column: &sqlx::mysql::MySqlColumn) -> Value {
        use sqlx::{Column, Row, TypeInfo};

        let type_name = column.type_info().name();
        let idx = column.ordinal();

        if type_name.ends_with("UNSIGNED") {
            return row
                .try_get::<u64, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null);
        }

        match type_name {
            "BOOLEAN" | "TINYINT(1)" => row
                .try_get::<bool, _>(idx)
                .map(Value::Bool)
                .unwrap_or(Value::Null),
            "TINYINT" | "SMALLINT" => row
                .try_get::<i16, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "INT" | "MEDIUMINT" => row
                .try_get::<i32, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "BIGINT" => row
                .try_get::<i64, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "FLOAT" => row
                .try_get::<f32, _>(idx)
                .map(|v| {
                    serde_json::Number::from_f64(v as f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                })
                .unwrap_or(Value::Null),
            "DOUBLE" => row
                .try_get::<f64, _>(idx)
                .map(|v| {
                    serde_json::Number::from_f64(v)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                })
                .unwrap_or(Value::Null),
            "DATETIME" | "TIMESTAMP" => row
                .try_get::<chrono::NaiveDateTime, _>(idx)
                .map(|v| Value::String(v.format("%Y-%m-%dT%H:%M:%S").to_string()))
                .unwrap_or(Value::Null),
            "DATE" => row
                .try_get::<chrono::NaiveDate, _>(idx)
                .map(|v| Value::String(v.to_string()))
                .unwrap_or(Value::Null),
            "JSON" => row.try_get::<Value, _>(idx).unwrap_or(Value::Null),
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => row
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
impl Session for MySqlSession {
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
        Dialect::Mysql
    }
}
