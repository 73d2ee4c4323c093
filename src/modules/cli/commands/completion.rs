//! Hidden command to generate shell completions.

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

/// Generate shell completion scripts.
///
/// Hidden from `--help`; packaging scripts call it.
#[derive(Args, Debug)]
pub struct CompletionCommand {
    /// Shell to generate completions for (e.g. bash, zsh)
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionCommand {
    pub fn execute(&self) {
        let mut cmd = crate::Cli::command();
        generate(self.shell, &mut cmd, "sqlblock", &mut std::io::stdout());
    }
}
