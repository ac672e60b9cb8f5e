//! # Rm Command Implementation
//!
//! This module implements the `rm` subcommand, which deletes a vendored
//! subdirectory and its `.subdirs` entry and stages both removals.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use git_subdir::path::VendorPath;

use crate::cli::Context;

/// Remove a vendored subdirectory and its registry entry
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Vendored subdirectory, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,
}

/// Execute the `rm` command.
pub fn execute(context: &Context, args: RmArgs) -> Result<ExitCode> {
    let path = VendorPath::parse(&args.path)?;
    let mut manager = context.manager()?;

    let entry = manager.deregister(&path)?;

    println!(
        "{}",
        context.output.success(&format!(
            "Removed {} ({})",
            entry.path, entry.source_location
        ))
    );
    Ok(ExitCode::SUCCESS)
}
