//! Query command implementation

use clap::Args;
use sqlblock_core::{BlockError, Row};
use sqlblock_runtime::tasks;
use sqlblock_store::BlockStore;
use tracing::debug;

use super::parse_params;

/// Query command arguments
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// Block name
    pub name: String,

    /// SQL query
    pub statement: String,

    /// Named parameter as key=value; the value is read as JSON when it parses
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Return at most this many rows
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

impl QueryCommand {
    /// Execute the query command
    pub async fn execute(&self, store: &dyn BlockStore) -> Result<(), BlockError> {
        let rows = self.rows(store).await?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
        Ok(())
    }

    async fn rows(&self, store: &dyn BlockStore) -> Result<Vec<Row>, BlockError> {
        let settings = store.load(&self.name)?;
        let params = parse_params(&self.params)?;
        let rows = tasks::query(&self.statement, settings, params, self.limit).await?;
        debug!("Fetched {} rows", rows.len());
        Ok(rows)
    }
}
