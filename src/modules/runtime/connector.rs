//! Connector core and the async connector surface
//!
//! [`ConnectorCore`] holds all connector state and logic. [`AsyncConnector`]
//! exposes it directly; the blocking [`crate::Connector`] drives the same
//! core on a private runtime.

use futures::future::BoxFuture;
use sqlblock_core::{
    BlockError, ConnectionConfig, ConnectorSettings, CursorResult, Parameters, Result, Row,
};
use sqlblock_store::BlockStore;
use tracing::{debug, info, warn};

use crate::connectors::{Engine, Session};
use crate::cursor::{CursorCache, StatementKey};
use crate::executor::bind_parameters;

const BEGIN: &str = "BEGIN";
const COMMIT: &str = "COMMIT";
const ROLLBACK: &str = "ROLLBACK";

/// Which driver family a connector surface accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConnectorMode {
    Blocking,
    Async,
}

impl ConnectorMode {
    fn accepts_async(self) -> bool {
        matches!(self, ConnectorMode::Async)
    }
}

/// State shared by both connector surfaces
pub(crate) struct ConnectorCore {
    settings: ConnectorSettings,
    mode: ConnectorMode,
    engine: Option<Engine>,
    session: Option<Box<dyn Session>>,
    cursors: CursorCache,
    in_transaction: bool,
    closed: bool,
}

impl ConnectorCore {
    pub(crate) fn new(settings: ConnectorSettings, mode: ConnectorMode) -> Self {
        Self {
            settings,
            mode,
            engine: None,
            session: None,
            cursors: CursorCache::new(),
            in_transaction: false,
            closed: false,
        }
    }

    pub(crate) fn settings(&self) -> &ConnectorSettings {
        &self.settings
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(BlockError::State("Connector is closed".to_string()));
        }
        Ok(())
    }

    /// Return the engine, creating it on first use
    ///
    /// Pools connect lazily, so this performs no I/O. It must still run inside
    /// a tokio runtime because the pool spawns its maintenance task.
    pub(crate) fn get_engine(&mut self) -> Result<&Engine> {
        self.ensure_open()?;
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                let driver = self.settings.driver()?;
                if driver.is_async() != self.mode.accepts_async() {
                    let (expected, surface) = match self.mode {
                        ConnectorMode::Blocking => ("blocking", "Connector"),
                        ConnectorMode::Async => ("async", "AsyncConnector"),
                    };
                    return Err(BlockError::Configuration(format!(
                        "Driver '{}' cannot be used with {}; it requires a {} driver",
                        driver, surface, expected
                    )));
                }
                self.settings.validate()?;
                Engine::create(&self.settings.connection, &self.settings.engine)?
            }
        };
        Ok(self.engine.insert(engine))
    }

    /// Return the session, opening it on first use
    pub(crate) async fn get_connection(&mut self) -> Result<&mut Box<dyn Session>> {
        self.ensure_open()?;
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let engine = self.get_engine()?.clone();
                let session = engine.connect().await?;
                debug!("Opened {} session", session.dialect());
                session
            }
        };
        Ok(self.session.insert(session))
    }

    /// Run one statement on the session and buffer its result
    async fn run(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<CursorResult> {
        self.ensure_open()?;
        let dialect = self.get_engine()?.dialect();
        let bound = bind_parameters(statement, parameters, dialect)?;

        if self.settings.engine.echo {
            info!(statement = %bound.sql, binds = ?bound.binds, "Executing statement");
        } else {
            debug!(statement = %bound.sql, "Executing statement");
        }

        let begin = self.settings.engine.future && !self.in_transaction;
        let session = self.get_connection().await?;
        if begin {
            session.execute(BEGIN, None).await?;
        }
        let result = session.execute(&bound.sql, bound.binds).await;
        if begin {
            self.in_transaction = true;
        }
        result
    }

    pub(crate) async fn execute(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<CursorResult> {
        self.run(statement, parameters).await
    }

    pub(crate) async fn execute_many(
        &mut self,
        statement: &str,
        seq_of_parameters: &[Parameters],
    ) -> Result<CursorResult> {
        self.ensure_open()?;
        let mut rows_affected = 0;
        for parameters in seq_of_parameters {
            rows_affected += self.run(statement, Some(parameters)).await?.rows_affected();
        }
        Ok(CursorResult::from_rows_affected(rows_affected))
    }

    /// Cursor for a statement, executing it when none is open
    async fn cursor(
        &mut self,
        key: &StatementKey,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<&mut CursorResult> {
        if !self.cursors.contains(key) {
            let result = self.run(statement, parameters).await?;
            debug!(rows = result.remaining(), "Opened cursor");
            return Ok(self.cursors.insert(key.clone(), result));
        }
        self.cursors
            .get_mut(key)
            .ok_or_else(|| BlockError::State("No cursor open for statement".to_string()))
    }

    pub(crate) async fn fetch_one(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<Option<Row>> {
        self.ensure_open()?;
        let key = StatementKey::new(statement, parameters);
        let row = self.cursor(&key, statement, parameters).await?.fetch_one();
        if row.is_none() {
            self.discard(&key);
        }
        Ok(row)
    }

    pub(crate) async fn fetch_many(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
        size: Option<usize>,
    ) -> Result<Vec<Row>> {
        self.ensure_open()?;
        let size = size.unwrap_or(self.settings.fetch_size);
        if size == 0 {
            return Ok(Vec::new());
        }
        let key = StatementKey::new(statement, parameters);
        let rows = self.cursor(&key, statement, parameters).await?.fetch_many(size);
        if rows.is_empty() {
            self.discard(&key);
        }
        Ok(rows)
    }

    pub(crate) async fn fetch_all(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<Vec<Row>> {
        self.ensure_open()?;
        let key = StatementKey::new(statement, parameters);
        let rows = self.cursor(&key, statement, parameters).await?.fetch_all();
        self.discard(&key);
        Ok(rows)
    }

    fn discard(&mut self, key: &StatementKey) {
        if self.cursors.remove(key).is_some() {
            debug!(statement = key.statement(), "Discarded exhausted cursor");
        }
    }

    pub(crate) fn reset_cursors(&mut self) -> Result<()> {
        self.ensure_open()?;
        let count = self.cursors.clear();
        debug!("Reset {} cursors", count);
        Ok(())
    }

    /// Drop cursors and the session, rolling back any open transaction
    ///
    /// The engine stays; the next statement checks out a fresh session.
    pub(crate) async fn reset_connection(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.cursors.clear();
        let rollback = self.end_transaction(ROLLBACK).await;
        if self.session.take().is_some() {
            debug!("Released session");
        }
        rollback
    }

    /// Commit the open transaction; a no-op without one
    pub(crate) async fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.end_transaction(COMMIT).await
    }

    /// Roll back the open transaction; a no-op without one
    pub(crate) async fn rollback(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.end_transaction(ROLLBACK).await
    }

    async fn end_transaction(&mut self, statement: &str) -> Result<()> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        match self.session.as_mut() {
            Some(session) => {
                debug!("{}", statement);
                session.execute(statement, None).await.map(|_| ())
            }
            None => Ok(()),
        }
    }

    /// Release everything the connector holds
    ///
    /// Every step runs even when an earlier one fails; the first error is
    /// returned. Closing twice is a no-op.
    pub(crate) async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let count = self.cursors.clear();
        if count > 0 {
            debug!("Discarded {} cursors", count);
        }

        let mut first_error = None;
        if let Err(e) = self.end_transaction(ROLLBACK).await {
            warn!("Rollback failed while closing connector: {}", e);
            first_error = Some(e);
        }

        if self.session.take().is_some() {
            debug!("Released session");
        }
        if let Some(engine) = self.engine.take() {
            engine.dispose().await;
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Connector for async drivers
///
/// Every operation suspends while waiting on the database. All statements
/// share one session, so calls are served in the order they are awaited.
/// Dropping an in-flight future leaves the session in an undefined state:
/// `close()` the connector and build a new one.
///
/// # Example
///
/// ```no_run
/// use sqlblock_core::{ConnectionConfig, ConnectorSettings};
/// use sqlblock_runtime::AsyncConnector;
///
/// # async fn run() -> sqlblock_core::Result<()> {
/// let settings = ConnectorSettings::new(ConnectionConfig::url("sqlite+async://")?);
/// let mut connector = AsyncConnector::new(settings);
/// connector.execute("CREATE TABLE t (x INTEGER)", None).await?;
/// let rows = connector.fetch_all("SELECT x FROM t", None).await?;
/// connector.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct AsyncConnector {
    core: ConnectorCore,
}

impl AsyncConnector {
    /// Create a connector; nothing connects until the first statement
    pub fn new(settings: ConnectorSettings) -> Self {
        Self {
            core: ConnectorCore::new(settings, ConnectorMode::Async),
        }
    }

    /// Create a connector with default engine options
    pub fn from_config(connection: impl Into<ConnectionConfig>) -> Self {
        Self::new(ConnectorSettings::new(connection))
    }

    pub fn settings(&self) -> &ConnectorSettings {
        self.core.settings()
    }

    pub async fn get_engine(&mut self) -> Result<&Engine> {
        self.core.get_engine()
    }

    pub async fn get_connection(&mut self) -> Result<&mut Box<dyn Session>> {
        self.core.get_connection().await
    }

    /// Execute a statement and return its result
    ///
    /// The result is not cached; use the fetch operations to page through
    /// rows across calls.
    pub async fn execute(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<CursorResult> {
        self.core.execute(statement, parameters).await
    }

    /// Execute a statement once per parameter set, in order
    ///
    /// The returned result carries the total rows affected. Statements that
    /// ran before a failure are not rolled back.
    pub async fn execute_many(
        &mut self,
        statement: &str,
        seq_of_parameters: &[Parameters],
    ) -> Result<CursorResult> {
        self.core.execute_many(statement, seq_of_parameters).await
    }

    /// Fetch the next row of the statement's cursor
    pub async fn fetch_one(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<Option<Row>> {
        self.core.fetch_one(statement, parameters).await
    }

    /// Fetch the next page of the statement's cursor
    ///
    /// `size` defaults to the configured `fetch_size`.
    pub async fn fetch_many(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
        size: Option<usize>,
    ) -> Result<Vec<Row>> {
        self.core.fetch_many(statement, parameters, size).await
    }

    /// Fetch every remaining row of the statement's cursor
    pub async fn fetch_all(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<Vec<Row>> {
        self.core.fetch_all(statement, parameters).await
    }

    pub fn reset_cursors(&mut self) -> Result<()> {
        self.core.reset_cursors()
    }

    pub async fn reset_connection(&mut self) -> Result<()> {
        self.core.reset_connection().await
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.core.commit().await
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.core.rollback().await
    }

    pub async fn close(&mut self) -> Result<()> {
        self.core.close().await
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Run a callback with the connector, closing it on every exit path
    ///
    /// The callback's error takes precedence over an error from closing.
    pub async fn scoped<F, T>(mut self, f: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut AsyncConnector) -> BoxFuture<'a, Result<T>>,
    {
        let result = f(&mut self).await;
        let closed = self.close().await;
        match result {
            Ok(value) => closed.map(|_| value),
            Err(e) => {
                if let Err(close_error) = closed {
                    warn!("Failed to close connector: {}", close_error);
                }
                Err(e)
            }
        }
    }

    /// Persist the settings under `name`
    pub fn save(&self, store: &dyn BlockStore, name: &str, overwrite: bool) -> Result<()> {
        store.save(name, self.settings(), overwrite)
    }

    /// Rebuild a connector from settings saved under `name`
    pub fn load(store: &dyn BlockStore, name: &str) -> Result<Self> {
        Ok(Self::new(store.load(name)?))
    }
}
