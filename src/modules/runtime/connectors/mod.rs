//! Database engines and sessions
//!
//! This module provides one session type per dialect over sqlx and the
//! [`Engine`] that creates them.

use sqlblock_core::BlockError;

/// Bind JSON values onto a sqlx query in order
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                serde_json::Value::Null => query.bind(None::<String>),
                serde_json::Value::Bool(b) => query.bind(b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => query.bind(i),
                    None => query.bind(n.as_f64()),
                },
                serde_json::Value::String(s) => query.bind(s),
                other => query.bind(sqlx::types::Json(other)),
            };
        }
        query
    }};
}

/// Drain a `fetch_many` stream into a buffered [`sqlblock_core::CursorResult`]
///
/// Each statement of a script ends with a query result; rows after it belong
/// to the next result set and get that set's column names.
macro_rules! collect_results {
    ($stream:expr, $row_values:path) => {{
        use futures::TryStreamExt;
        use sqlx::{Column as _, Row as _};

        let mut stream = $stream;
        let mut rows_affected: u64 = 0;
        let mut first_columns: Option<std::sync::Arc<Vec<String>>> = None;
        let mut columns: Option<std::sync::Arc<Vec<String>>> = None;
        let mut rows = Vec::new();

        while let Some(item) = stream
            .try_next()
            .await
            .map_err($crate::connectors::driver_error)?
        {
            match item {
                sqlx::Either::Left(done) => {
                    rows_affected += done.rows_affected();
                    columns = None;
                }
                sqlx::Either::Right(row) => {
                    let names = columns
                        .get_or_insert_with(|| {
                            std::sync::Arc::new(
                                row.columns().iter().map(|c| c.name().to_string()).collect(),
                            )
                        })
                        .clone();
                    if first_columns.is_none() {
                        first_columns = Some(names.clone());
                    }
                    rows.push(sqlblock_core::Row::new(names, $row_values(&row)));
                }
            }
        }

        Ok(sqlblock_core::CursorResult::new(
            first_columns.unwrap_or_default(),
            rows,
            rows_affected,
        ))
    }};
}

mod engine;
mod mysql;
mod postgres;
mod sqlite;
mod traits;

pub use engine::Engine;
pub use mysql::MySqlSession;
pub use postgres::PostgresSession;
pub use sqlite::SqliteSession;
pub use traits::Session;

/// Map a sqlx error onto the error taxonomy
///
/// Bad URLs and options surface as configuration errors; everything else the
/// driver reports is an execution error carrying the original as its source.
pub(crate) fn driver_error(error: sqlx::Error) -> BlockError {
    match error {
        sqlx::Error::Configuration(e) => BlockError::Configuration(e.to_string()),
        other => BlockError::Execution(Box::new(other)),
    }
}
