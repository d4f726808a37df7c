//! `securevault completions`: generate shell completion scripts.
//!
//! Usage:
//!   securevault completions bash > ~/.local/share/bash-completion/completions/securevault
//!   securevault completions zsh > ~/.zfunc/_securevault

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Binary name baked into the generated scripts.
const BIN_NAME: &str = "securevault";

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout())
}

fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_script_mentions_subcommands() {
        let out = script(Shell::Bash);
        assert!(out.contains("securevault"));
        assert!(out.contains("rotate-key"));
        assert!(out.contains("generate"));
    }

    #[test]
    fn every_shell_produces_output() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(!script(shell).is_empty(), "{shell} produced nothing");
        }
    }
}
