//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `git-subdir`
//! command-line tool. Each subcommand is defined in its own file to keep the
//! logic separated and maintainable.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the shared [`Context`](crate::cli::Context)
//!   and the parsed `Args`, calls into the `git_subdir` library, and prints the
//!   outcome.
//!
//! | Command   | Library operation            |
//! |-----------|------------------------------|
//! | `clone`   | `VendorManager::register`    |
//! | `pull`    | `VendorManager::refresh`     |
//! | `push`    | `VendorManager::export`      |
//! | `rm`      | `VendorManager::deregister`  |
//! | `restore` | `VendorManager::restore`     |
//! | `list`    | `RegistryStore::entries`     |
//! | `check`   | `VendorManager::verify`      |

pub mod check;
pub mod clone;
pub mod completions;
pub mod list;
pub mod pull;
pub mod push;
pub mod restore;
pub mod rm;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use git_subdir::output::OutputConfig;

/// Spinner shown while a network fetch is running. Hidden without colour
/// support so piped output stays clean.
pub(crate) fn spinner(output: &OutputConfig, message: String) -> ProgressBar {
    if !output.use_color {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
