//! sqlblock CLI
//!
//! Command-line interface for saving SQL connection blocks and running
//! statements through them.

use clap::Parser;
use sqlblock_cli::{Cli, Commands};
use sqlblock_core::BlockError;
use sqlblock_store::FileBlockStore;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BlockError> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let store = FileBlockStore::new(&cli.store);

    // Execute command
    match cli.command {
        Commands::Save(cmd) => {
            cmd.execute(&store).await?;
        }
        Commands::Show(cmd) => {
            cmd.execute(&store).await?;
        }
        Commands::List(cmd) => {
            cmd.execute(&store).await?;
        }
        Commands::Delete(cmd) => {
            cmd.execute(&store).await?;
        }
        Commands::Execute(cmd) => {
            cmd.execute(&store).await?;
        }
        Commands::Query(cmd) => {
            cmd.execute(&store).await?;
        }
        Commands::Completion(cmd) => {
            cmd.execute();
        }
    }

    Ok(())
}
