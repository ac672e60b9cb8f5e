//! `completions`: print a shell completion script for git-subdir.
//!
//! The script covers every subcommand (`clone`, `pull`, `push`, `rm`,
//! `restore`, `list`, `check`) and the global `--root`, `--git` and
//! `--log-level` flags. Vendored paths are not completed; the shell falls
//! back to file names for them, which matches how they are typed.
//!
//! ```bash
//! git-subdir completions bash > ~/.local/share/bash-completion/completions/git-subdir
//! git-subdir completions zsh > ~/.zfunc/_git-subdir
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

const BIN_NAME: &str = "git-subdir";

/// Print a shell completion script
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<ExitCode> {
    write_script(args.shell, &mut io::stdout())?;
    Ok(ExitCode::SUCCESS)
}

fn write_script(shell: Shell, out: &mut dyn Write) -> io::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    out.flush()
}
