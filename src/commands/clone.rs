//! # Clone Command Implementation
//!
//! This module implements the `clone` subcommand, which vendors a repository
//! into a new subdirectory of the host repository.
//!
//! ## Functionality
//!
//! - **Full clone**: the source is cloned with its full history so any
//!   revision can be selected.
//! - **Pinning**: the working copy is moved to the requested revision (a
//!   hash, branch or tag; the default branch when omitted) and the exact
//!   commit is recorded in `.subdirs`.
//! - **Flattening**: nested submodules are materialised and every `.git`
//!   marker is removed, leaving plain files.
//! - **Staging**: the new directory and `.subdirs` are staged. Nothing is
//!   committed.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use git_subdir::path::VendorPath;

use crate::cli::Context;
use crate::commands::spinner;

/// Vendor a repository into a new subdirectory
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Subdirectory to create, relative to the repository root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Repository to clone
    #[arg(value_name = "URL")]
    pub url: String,

    /// Revision, branch or tag to check out (default branch if omitted)
    #[arg(value_name = "REVISION")]
    pub revision: Option<String>,
}

/// Execute the `clone` command.
pub fn execute(context: &Context, args: CloneArgs) -> Result<ExitCode> {
    let path = VendorPath::parse(&args.path)?;
    let mut manager = context.manager()?;

    let progress = spinner(&context.output, format!("Cloning {}...", args.url));
    let result = manager.register(&path, &args.url, args.revision.as_deref());
    progress.finish_and_clear();
    let entry = result?;

    println!(
        "{}",
        context.output.success(&format!(
            "Cloned {} into {} at {}",
            entry.source_location,
            entry.path,
            context.output.dim(entry.pinned_revision.as_str())
        ))
    );
    println!("Review and commit the staged changes when ready.");
    Ok(ExitCode::SUCCESS)
}
