//! Blocking connector surface
//!
//! Drives the shared connector core on a current-thread tokio runtime owned
//! by the connector. Calls block the calling thread until the driver returns,
//! so a blocking connector must not be used from inside an async runtime.

use sqlblock_core::{ConnectionConfig, ConnectorSettings, CursorResult, Parameters, Result, Row};
use sqlblock_store::BlockStore;
use std::ops::{Deref, DerefMut};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use crate::connector::{ConnectorCore, ConnectorMode};
use crate::connectors::Engine;

/// Connector for blocking drivers
///
/// Dropping a connector that was not closed closes it, including on threads
/// that belong to a tokio runtime.
///
/// # Example
///
/// ```no_run
/// use sqlblock_core::{ConnectionConfig, ConnectorSettings};
/// use sqlblock_runtime::Connector;
///
/// # fn run() -> sqlblock_core::Result<()> {
/// let settings = ConnectorSettings::new(ConnectionConfig::url("sqlite:///data.db")?);
/// let rows = Connector::new(settings).scoped(|connector| {
///     connector.fetch_many("SELECT * FROM customers", None, Some(10))
/// })?;
/// # Ok(())
/// # }
/// ```
pub struct Connector {
    core: ConnectorCore,
    runtime: Option<Runtime>,
}

/// Return the connector's runtime, building it on first use
fn runtime(slot: &mut Option<Runtime>) -> Result<&Runtime> {
    let runtime = match slot.take() {
        Some(runtime) => runtime,
        None => {
            debug!("Starting connector runtime");
            Builder::new_current_thread().enable_all().build()?
        }
    };
    Ok(slot.insert(runtime))
}

impl Connector {
    /// Create a connector; nothing connects until the first statement
    pub fn new(settings: ConnectorSettings) -> Self {
        Self {
            core: ConnectorCore::new(settings, ConnectorMode::Blocking),
            runtime: None,
        }
    }

    /// Create a connector with default engine options
    pub fn from_config(connection: impl Into<ConnectionConfig>) -> Self {
        Self::new(ConnectorSettings::new(connection))
    }

    pub fn settings(&self) -> &ConnectorSettings {
        self.core.settings()
    }

    pub fn get_engine(&mut self) -> Result<&Engine> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        let _guard = runtime.enter();
        self.core.get_engine()
    }

    /// Open the connector's session if it is not open yet
    pub fn get_connection(&mut self) -> Result<()> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.get_connection()).map(|_| ())
    }

    /// Execute a statement and return its result
    pub fn execute(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<CursorResult> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.execute(statement, parameters))
    }

    /// Execute a statement once per parameter set, in order
    pub fn execute_many(
        &mut self,
        statement: &str,
        seq_of_parameters: &[Parameters],
    ) -> Result<CursorResult> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.execute_many(statement, seq_of_parameters))
    }

    pub fn fetch_one(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<Option<Row>> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.fetch_one(statement, parameters))
    }

    /// Fetch the next page of the statement's cursor
    ///
    /// `size` defaults to the configured `fetch_size`. Repeating the call with
    /// the same statement and parameters continues where the last page ended.
    pub fn fetch_many(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
        size: Option<usize>,
    ) -> Result<Vec<Row>> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.fetch_many(statement, parameters, size))
    }

    pub fn fetch_all(
        &mut self,
        statement: &str,
        parameters: Option<&Parameters>,
    ) -> Result<Vec<Row>> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.fetch_all(statement, parameters))
    }

    pub fn reset_cursors(&mut self) -> Result<()> {
        self.core.reset_cursors()
    }

    pub fn reset_connection(&mut self) -> Result<()> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.reset_connection())
    }

    pub fn commit(&mut self) -> Result<()> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.commit())
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.core.ensure_open()?;
        let runtime = runtime(&mut self.runtime)?;
        runtime.block_on(self.core.rollback())
    }

    /// Release the session and dispose the engine
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        match self.runtime.as_ref() {
            Some(runtime) => runtime.block_on(self.core.close()),
            // Nothing was opened without a runtime
            None => futures::executor::block_on(self.core.close()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.core.is_closed()
    }

    /// Run a callback with the connector, closing it on every exit path
    ///
    /// The callback's error takes precedence over an error from closing.
    pub fn scoped<F, T>(mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connector) -> Result<T>,
    {
        let result = f(&mut self);
        let closed = self.close();
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

    /// Turn the connector into a guard that closes it when dropped
    pub fn enter(self) -> ConnectorGuard {
        ConnectorGuard { connector: self }
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

impl Connector {
    fn close_on_drop(&mut self) {
        if self.runtime.is_none() {
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            self.close_quietly();
            return;
        }
        // Blocking on or dropping the private runtime panics on a thread that
        // belongs to another runtime, so both happen on a scoped thread
        std::thread::scope(|scope| {
            let closing = scope.spawn(|| {
                self.close_quietly();
                drop(self.runtime.take());
            });
            if closing.join().is_err() {
                warn!("Connector close panicked on drop");
            }
        });
    }

    fn close_quietly(&mut self) {
        if self.core.is_closed() {
            return;
        }
        if let Err(e) = self.close() {
            warn!("Failed to close connector on drop: {}", e);
        }
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        self.close_on_drop();
    }
}

/// Scoped use of a [`Connector`]; closes the connector when dropped
pub struct ConnectorGuard {
    connector: Connector,
}

impl Deref for ConnectorGuard {
    type Target = Connector;

    fn deref(&self) -> &Connector {
        &self.connector
    }
}

impl DerefMut for ConnectorGuard {
    fn deref_mut(&mut self) -> &mut Connector {
        &mut self.connector
    }
}

impl Drop for ConnectorGuard {
    fn drop(&mut self) {
        self.connector.close_on_drop();
    }
}
