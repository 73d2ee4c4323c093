//! CLI commands

mod completion;
mod delete;
mod execute;
mod list;
mod query;
mod save;
mod show;

pub use completion::CompletionCommand;
pub use delete::DeleteCommand;
pub use execute::ExecuteCommand;
pub use list::ListCommand;
pub use query::QueryCommand;
pub use save::SaveCommand;
pub use show::ShowCommand;

use clap::{Parser, Subcommand};
use serde_json::Value;
use sqlblock_core::{BlockError, Parameters};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// sqlblock - Saved SQL connection blocks
#[derive(Parser, Debug)]
#[command(name = "sqlblock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding saved blocks
    ///
    /// Global, so it can follow the subcommand, e.g.
    /// `sqlblock list --store ./blocks`.
    #[arg(short = 's', long = "store", global = true, default_value = ".sqlblock")]
    pub store: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save a connection block
    Save(SaveCommand),

    /// Show a saved block
    Show(ShowCommand),

    /// List saved blocks
    List(ListCommand),

    /// Delete a saved block
    Delete(DeleteCommand),

    /// Execute a statement through a block
    Execute(ExecuteCommand),

    /// Run a query through a block and print its rows as JSON
    Query(QueryCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completion(CompletionCommand),
}

/// Split a `key=value` argument
pub(crate) fn split_pair(arg: &str) -> Result<(&str, &str), BlockError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(BlockError::Configuration(format!(
            "Expected key=value, got '{}'",
            arg
        ))),
    }
}

/// Build named parameters from `key=value` arguments
///
/// Values are read as JSON when they parse, and as plain strings otherwise,
/// so `id=3` binds a number and `name=ada` binds a string.
pub(crate) fn parse_params(args: &[String]) -> Result<Option<Parameters>, BlockError> {
    if args.is_empty() {
        return Ok(None);
    }
    let mut values = BTreeMap::new();
    for arg in args {
        let (key, raw) = split_pair(arg)?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        values.insert(key.to_string(), value);
    }
    Ok(Some(Parameters::Named(values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["sqlblock", "list"]).unwrap();
        assert_eq!(cli.store, PathBuf::from(".sqlblock"));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["sqlblock", "show", "prod", "--store", "blocks", "-v"]).unwrap();
        assert_eq!(cli.store, PathBuf::from("blocks"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Show(_)));
    }

    #[test]
    fn test_parse_params() {
        let args = vec![
            "id=3".to_string(),
            "name=ada".to_string(),
            "tags=[\"a\"]".to_string(),
            "expr=a=b".to_string(),
        ];
        let params = parse_params(&args).unwrap().unwrap();
        assert_eq!(
            params,
            Parameters::named([
                ("id", json!(3)),
                ("name", json!("ada")),
                ("tags", json!(["a"])),
                ("expr", json!("a=b")),
            ])
        );

        assert!(parse_params(&[]).unwrap().is_none());
        assert!(parse_params(&["novalue".to_string()]).unwrap_err().is_configuration());
    }
}
