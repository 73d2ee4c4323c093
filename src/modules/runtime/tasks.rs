//! One-shot helpers
//!
//! Each call opens a connector for the given settings, runs one statement,
//! commits when the engine is transactional and closes the connector on
//! every path. Blocking drivers run on tokio's blocking pool.

use sqlblock_core::{BlockError, ConnectorSettings, Parameters, Result, Row};
use tracing::debug;

use crate::{AsyncConnector, Connector};

/// Execute a statement that returns no rows, such as DDL or DML
///
/// Returns the number of rows affected.
pub async fn execute(
    statement: &str,
    settings: ConnectorSettings,
    parameters: Option<Parameters>,
) -> Result<u64> {
    let statement = statement.to_string();
    let driver = settings.driver()?;
    debug!(driver = %driver, "Running one-shot execute");

    if driver.is_async() {
        AsyncConnector::new(settings)
            .scoped(move |connector| {
                Box::pin(async move {
                    let result = connector.execute(&statement, parameters.as_ref()).await?;
                    connector.commit().await?;
                    Ok(result.rows_affected())
                })
            })
            .await
    } else {
        spawn_blocking(move || {
            Connector::new(settings).scoped(|connector| {
                let result = connector.execute(&statement, parameters.as_ref())?;
                connector.commit()?;
                Ok(result.rows_affected())
            })
        })
        .await
    }
}

/// Run a query and return its rows, at most `limit` of them when given
pub async fn query(
    statement: &str,
    settings: ConnectorSettings,
    parameters: Option<Parameters>,
    limit: Option<usize>,
) -> Result<Vec<Row>> {
    let statement = statement.to_string();
    let driver = settings.driver()?;
    debug!(driver = %driver, "Running one-shot query");

    if driver.is_async() {
        AsyncConnector::new(settings)
            .scoped(move |connector| {
                Box::pin(async move {
                    let mut result = connector.execute(&statement, parameters.as_ref()).await?;
                    connector.commit().await?;
                    Ok(take_rows(&mut result, limit))
                })
            })
            .await
    } else {
        spawn_blocking(move || {
            Connector::new(settings).scoped(|connector| {
                let mut result = connector.execute(&statement, parameters.as_ref())?;
                connector.commit()?;
                Ok(take_rows(&mut result, limit))
            })
        })
        .await
    }
}

fn take_rows(result: &mut sqlblock_core::CursorResult, limit: Option<usize>) -> Vec<Row> {
    match limit {
        Some(limit) => result.fetch_many(limit),
        None => result.fetch_all(),
    }
}

async fn spawn_blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BlockError::execution(format!("Connector task failed: {}", e)))?
}
