//! Delete command implementation

use clap::Args;
use sqlblock_core::BlockError;
use sqlblock_store::BlockStore;
use tracing::info;

/// Delete command arguments
#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// Block name
    pub name: String,
}

impl DeleteCommand {
    /// Execute the delete command
    pub async fn execute(&self, store: &dyn BlockStore) -> Result<(), BlockError> {
        store.delete(&self.name)?;
        info!("Deleted block '{}'", self.name);
        Ok(())
    }
}
