//! # git-subdir CLI
//!
//! This is the binary entry point for the `git-subdir` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Translating failures into an `error:` line on stdout and exit code 1.
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let output = cli.output_config();
    match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            println!("{}", output.error(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}
