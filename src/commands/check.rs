//! # Check Command Implementation
//!
//! This module implements the `check` subcommand, which verifies that every
//! subdirectory recorded in `.subdirs` exists on disk. It exits with status
//! 1 if any are missing, so it can run in CI.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::cli::Context;

/// Check that every registered subdirectory exists on disk
#[derive(Args, Debug)]
pub struct CheckArgs {}

/// Execute the `check` command.
pub fn execute(context: &Context, _args: CheckArgs) -> Result<ExitCode> {
    let manager = context.manager()?;
    let total = manager.registry().entries().len();
    let missing = manager.verify();

    if missing.is_empty() {
        println!(
            "{}",
            context
                .output
                .success(&format!("{} vendored subdirectories present", total))
        );
        return Ok(ExitCode::SUCCESS);
    }

    for entry in &missing {
        println!(
            "{}",
            context.output.error(&format!(
                "{} is registered but missing on disk (run `git-subdir restore {}`)",
                entry.path, entry.path
            ))
        );
    }
    Ok(ExitCode::FAILURE)
}
