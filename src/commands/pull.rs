//! # Pull Command Implementation
//!
//! This module implements the `pull` subcommand, which replaces the content
//! of a vendored subdirectory with its source at a newer (or different)
//! revision. The source location recorded in `.subdirs` is reused; only the
//! pinned revision changes.
//!
//! The subdirectory must have no modified or untracked files, since it is
//! deleted and fetched again wholesale.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use git_subdir::path::VendorPath;

use crate::cli::Context;
use crate::commands::spinner;

/// Re-fetch a vendored subdirectory at a new revision
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Vendored subdirectory, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Revision, branch or tag to check out (default branch if omitted)
    #[arg(value_name = "REVISION")]
    pub revision: Option<String>,

    /// Refuse to pull unless the recorded source location is this URL
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}

/// Execute the `pull` command.
pub fn execute(context: &Context, args: PullArgs) -> Result<ExitCode> {
    let path = VendorPath::parse(&args.path)?;
    let mut manager = context.manager()?;
    let previous = manager.lookup(&path).map(|entry| entry.pinned_revision);

    let progress = spinner(&context.output, format!("Pulling {}...", path));
    let result = manager.refresh(&path, args.revision.as_deref(), args.url.as_deref());
    progress.finish_and_clear();
    let entry = result?;

    let message = match previous {
        Some(previous) if previous == entry.pinned_revision => {
            format!("{} is already at {}", entry.path, entry.pinned_revision.short())
        }
        Some(previous) => format!(
            "Updated {}: {} → {}",
            entry.path,
            context.output.dim(previous.short()),
            entry.pinned_revision.short()
        ),
        None => format!("Updated {} to {}", entry.path, entry.pinned_revision.short()),
    };
    println!("{}", context.output.success(&message));
    Ok(ExitCode::SUCCESS)
}
