//! Execute command implementation

use clap::Args;
use sqlblock_core::BlockError;
use sqlblock_runtime::tasks;
use sqlblock_store::BlockStore;
use tracing::info;

use super::parse_params;

/// Execute command arguments
#[derive(Args, Debug)]
pub struct ExecuteCommand {
    /// Block name
    pub name: String,

    /// SQL statement
    pub statement: String,

    /// Named parameter as key=value; the value is read as JSON when it parses
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

impl ExecuteCommand {
    /// Execute the execute command
    pub async fn execute(&self, store: &dyn BlockStore) -> Result<(), BlockError> {
        let settings = store.load(&self.name)?;
        let params = parse_params(&self.params)?;
        let rows_affected = tasks::execute(&self.statement, settings, params).await?;
        info!("{} rows affected", rows_affected);
        Ok(())
    }
}
