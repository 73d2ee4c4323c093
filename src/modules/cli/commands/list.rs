//! List command implementation

use clap::Args;
use sqlblock_core::BlockError;
use sqlblock_store::BlockStore;
use tracing::info;

/// List command arguments
#[derive(Args, Debug)]
pub struct ListCommand {}

impl ListCommand {
    /// Execute the list command
    pub async fn execute(&self, store: &dyn BlockStore) -> Result<(), BlockError> {
        let names = store.list()?;
        if names.is_empty() {
            info!("No saved blocks");
        }
        for name in names {
            println!("{}", name);
        }
        Ok(())
    }
}
