//! SQLite session implementation

use async_trait::async_trait;
use serde_json::Value;
use sqlblock_core::{BlockError, CursorResult, PoolConfig};
use sqlblock_types::Dialect;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Connection, Executor, Sqlite};
use std::str::FromStr;

use super::driver_error;
use super::traits::Session;

/// Create a lazily connecting SQLite pool
///
/// Database files are created on first connect unless the URL asks for
/// `mode=ro`.
pub(crate) fn create_pool(url: &str, config: &PoolConfig) -> Result<SqlitePool, BlockError> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(driver_error)?
        .create_if_missing(true);
    Ok(SqlitePoolOptions::new()
        .max_connections(config.max_connections())
        .min_connections(config.min_connections())
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect_lazy_with(options))
}

/// SQLite session holding one pooled connection
pub struct SqliteSession {
    conn: PoolConnection<Sqlite>,
}

impl SqliteSession {
    pub fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self { conn }
    }

    /// Convert a SQLite row to values in column order
    fn row_values(row: &SqliteRow) -> Vec<Value> {
        use sqlx::Row;

        row.columns()
            .iter()
            .map(|column| Self::get_column_value(row, column))
            .collect()
    }

    /// Get a column value as a JSON value
    ///
    /// SQLite types values rather than columns, so decoding follows the
    /// value's storage class. The declared type only marks booleans.
    fn get_column_value(row: &SqliteRow, column: &sqlx::sqlite::SqliteColumn) -> Value {
        use sqlx::{Column, Row, TypeInfo, ValueRef};

        let idx = column.ordinal();
        let declared = column.type_info().name().to_ascii_uppercase();

        let storage = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return Value::Null,
            Ok(raw) => raw.type_info().name().to_string(),
            Err(_) => return Value::Null,
        };

        match storage.as_str() {
            "INTEGER" if declared == "BOOLEAN" => row
                .try_get::<bool, _>(idx)
                .map(Value::Bool)
                .unwrap_or(Value::Null),
            "INTEGER" => row
                .try_get::<i64, _>(idx)
                .map(|v| Value::Number(v.into()))
                .unwrap_or(Value::Null),
            "REAL" => row
                .try_get::<f64, _>(idx)
                .map(|v| {
                    serde_json::Number::from_f64(v)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                })
                .unwrap_or(Value::Null),
            "BLOB" => row
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
impl Session for SqliteSession {
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
        Dialect::Sqlite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn session() -> SqliteSession {
        let pool = create_pool("sqlite::memory:", &PoolConfig::default()).unwrap();
        SqliteSession::new(pool.acquire().await.unwrap())
    }

    #[tokio::test]
    async fn test_script_and_decoding() {
        let mut session = session().await;
        session
            .execute(
                "CREATE TABLE t (id INTEGER, score REAL, name TEXT, raw BLOB, note TEXT);
                 INSERT INTO t VALUES (1, 2.5, 'alpha', x'0102', NULL);",
                None,
            )
            .await
            .unwrap();

        let mut result = session
            .execute("SELECT id, score, name, raw, note FROM t", None)
            .await
            .unwrap();
        assert_eq!(result.columns(), &["id", "score", "name", "raw", "note"]);
        let row = result.fetch_one().unwrap();
        assert_eq!(
            row.values(),
            &[
                json!(1),
                json!(2.5),
                json!("alpha"),
                json!([1, 2]),
                Value::Null
            ]
        );
    }

    #[tokio::test]
    async fn test_binds_and_rows_affected() {
        let mut session = session().await;
        session
            .execute("CREATE TABLE kv (k TEXT, v)", None)
            .await
            .unwrap();
        let result = session
            .execute(
                "INSERT INTO kv VALUES (?, ?), (?, ?)",
                Some(vec![json!("a"), json!(1), json!("b"), Value::Null]),
            )
            .await
            .unwrap();
        assert_eq!(result.rows_affected(), 2);

        let mut result = session
            .execute("SELECT v FROM kv WHERE k = ?", Some(vec![json!("b")]))
            .await
            .unwrap();
        assert_eq!(result.fetch_all()[0].get("v"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_syntax_error_is_execution_error() {
        let mut session = session().await;
        let err = session.execute("SELEC 1", None).await.unwrap_err();
        assert!(err.is_execution());
        session.ping().await.unwrap();
    }
}
