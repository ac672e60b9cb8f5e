//! # List Command Implementation
//!
//! This module implements the `list` subcommand, which prints the entries
//! of `.subdirs`, either one per line or as JSON for scripts.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::cli::Context;

/// List vendored subdirectories
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print entries as a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Execute the `list` command.
pub fn execute(context: &Context, args: ListArgs) -> Result<ExitCode> {
    let manager = context.manager()?;
    let entries = manager.registry().entries();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(ExitCode::SUCCESS);
    }

    if entries.is_empty() {
        println!("No vendored subdirectories.");
        return Ok(ExitCode::SUCCESS);
    }

    let width = entries
        .iter()
        .map(|entry| entry.path.as_str().len())
        .max()
        .unwrap_or(0);
    for entry in &entries {
        println!(
            "{:<width$}  {}  {}",
            entry.path.as_str(),
            context.output.dim(entry.pinned_revision.short()),
            entry.source_location,
            width = width
        );
    }
    Ok(ExitCode::SUCCESS)
}
