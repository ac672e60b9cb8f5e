//! # Push Command Implementation
//!
//! This module implements the `push` subcommand, which helps send local
//! changes to a vendored subdirectory back upstream. It checks out the
//! pinned revision in a local clone of the source and copies the vendored
//! files on top, leaving the result for the user to review and commit there.
//!
//! Files that exist in the local clone but not in the vendored directory
//! are left in place; deletions have to be carried over by hand.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use git_subdir::path::VendorPath;

use crate::cli::Context;

/// Copy a vendored subdirectory onto a local checkout of its source
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Vendored subdirectory, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Local clone of the source repository
    #[arg(value_name = "LOCAL_PATH")]
    pub destination: PathBuf,
}

/// Execute the `push` command.
pub fn execute(context: &Context, args: PushArgs) -> Result<ExitCode> {
    let path = VendorPath::parse(&args.path)?;
    let mut manager = context.manager()?;

    let report = manager.export(&path, &args.destination)?;

    println!(
        "{}",
        context.output.success(&format!(
            "Copied {} files from {} onto {} at {}",
            report.files_copied,
            report.entry.path,
            report.destination.display(),
            context.output.dim(report.entry.pinned_revision.short())
        ))
    );
    println!(
        "{}",
        context
            .output
            .warning("Files deleted from the vendored copy are not removed there; check before committing.")
    );
    Ok(ExitCode::SUCCESS)
}
