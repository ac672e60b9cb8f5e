//! # Restore Command Implementation
//!
//! This module implements the `restore` subcommand. When a registered
//! subdirectory has been deleted from disk (for example by an interrupted
//! `pull`), it is fetched again from the recorded source at the recorded
//! revision.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use git_subdir::path::VendorPath;

use crate::cli::Context;
use crate::commands::spinner;

/// Rebuild a registered subdirectory that has gone missing
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Vendored subdirectory, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,
}

/// Execute the `restore` command.
pub fn execute(context: &Context, args: RestoreArgs) -> Result<ExitCode> {
    let path = VendorPath::parse(&args.path)?;
    let mut manager = context.manager()?;

    let progress = spinner(&context.output, format!("Restoring {}...", path));
    let result = manager.restore(&path);
    progress.finish_and_clear();
    let entry = result?;

    println!(
        "{}",
        context.output.success(&format!(
            "Restored {} at {}",
            entry.path,
            context.output.dim(entry.pinned_revision.as_str())
        ))
    );
    Ok(ExitCode::SUCCESS)
}
