//! Show command implementation

use clap::Args;
use sqlblock_core::{BlockError, ConnectorSettings};
use sqlblock_store::BlockStore;

/// Show command arguments
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Block name
    pub name: String,
}

impl ShowCommand {
    /// Execute the show command
    pub async fn execute(&self, store: &dyn BlockStore) -> Result<(), BlockError> {
        let settings = store.load(&self.name)?;
        println!("{}", Self::render(&self.name, &settings));
        Ok(())
    }

    /// Human readable summary; the password is always masked
    fn render(name: &str, settings: &ConnectorSettings) -> String {
        let driver = settings
            .driver()
            .map(|d| d.to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let pool = &settings.engine.pool;

        let mut out = String::new();
        out.push_str(&format!("name:       {}\n", name));
        out.push_str(&format!("driver:     {}\n", driver));
        out.push_str(&format!("url:        {}\n", settings.connection.masked_url()));
        out.push_str(&format!("echo:       {}\n", settings.engine.echo));
        out.push_str(&format!("future:     {}\n", settings.engine.future));
        out.push_str(&format!("fetch_size: {}\n", settings.fetch_size));
        out.push_str(&format!(
            "pool:       max={} min={} acquire={}s idle={}s lifetime={}s",
            pool.max_connections(),
            pool.min_connections(),
            pool.acquire_timeout().as_secs(),
            pool.idle_timeout().as_secs(),
            pool.max_lifetime().as_secs()
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlblock_core::ConnectionConfig;
    use sqlblock_store::MemoryBlockStore;

    #[test]
    fn test_render_masks_password() {
        let settings = ConnectorSettings::new(
            ConnectionConfig::url("mysql://app:hunter2@db:3306/shop").unwrap(),
        );
        let out = ShowCommand::render("shop", &settings);
        assert!(out.contains("driver:     mysql"));
        assert!(out.contains("mysql://app:***@db:3306/shop"));
        assert!(!out.contains("hunter2"));
        assert!(out.contains("max=5 min=0"));
    }

    #[tokio::test]
    async fn test_show_missing_block() {
        let store = MemoryBlockStore::new();
        let cmd = ShowCommand {
            name: "nope".to_string(),
        };
        assert!(matches!(
            cmd.execute(&store).await,
            Err(BlockError::NotFound(_))
        ));
    }
}
