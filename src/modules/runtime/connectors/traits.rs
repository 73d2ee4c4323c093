//! Session trait definition

use async_trait::async_trait;
use serde_json::Value;
use sqlblock_core::{BlockError, CursorResult};
use sqlblock_types::Dialect;

/// One live connection checked out of an engine
///
/// All statements of a connector run through a single session. Dropping the
/// session returns its connection to the engine's pool.
#[async_trait]
pub trait Session: Send {
    /// Execute a statement and buffer its result
    ///
    /// # Arguments
    /// * `statement` - SQL text, with placeholders in the dialect's native form
    /// * `binds` - Values for the placeholders, in order. `None` runs the
    ///   statement unprepared, which allows multi-statement scripts.
    async fn execute(
        &mut self,
        statement: &str,
        binds: Option<Vec<Value>>,
    ) -> Result<CursorResult, BlockError>;

    /// Check that the connection is still usable
    async fn ping(&mut self) -> Result<(), BlockError>;

    /// Dialect spoken by this session
    fn dialect(&self) -> Dialect;
}
