//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser, Subcommand};

use git_subdir::defaults;
use git_subdir::output::OutputConfig;
use git_subdir::reconcile::VendorManager;

use crate::commands;

/// git-subdir - Vendor git repositories as plain subdirectories
#[derive(Parser, Debug)]
#[command(name = "git-subdir")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR", env = defaults::ROOT_ENV)]
    root: Option<PathBuf>,

    /// git executable to run
    #[arg(long, global = true, value_name = "PATH", env = defaults::GIT_ENV, default_value = defaults::DEFAULT_GIT)]
    git: PathBuf,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Vendor a repository into a new subdirectory
    Clone(commands::clone::CloneArgs),

    /// Re-fetch a vendored subdirectory at a new revision
    Pull(commands::pull::PullArgs),

    /// Copy a vendored subdirectory onto a local checkout of its source
    Push(commands::push::PushArgs),

    /// Remove a vendored subdirectory and its registry entry
    Rm(commands::rm::RmArgs),

    /// List vendored subdirectories
    List(commands::list::ListArgs),

    /// Check that every registered subdirectory exists on disk
    Check(commands::check::CheckArgs),

    /// Rebuild a registered subdirectory that has gone missing
    Restore(commands::restore::RestoreArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

/// Settings shared by every command.
pub struct Context {
    pub root: PathBuf,
    pub git: PathBuf,
    pub output: OutputConfig,
}

impl Context {
    /// Open the vendor manager for the configured repository root.
    pub fn manager(&self) -> Result<VendorManager> {
        VendorManager::open(&self.root, &self.git)
            .with_context(|| format!("failed to open {}", self.root.display()))
    }
}

impl Cli {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::from_env_and_flag(&self.color)
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .init();

        let output = self.output_config();
        console::set_colors_enabled(output.use_color);
        console::set_colors_enabled_stderr(output.use_color);

        let Some(command) = self.command else {
            Cli::command().print_help()?;
            println!();
            return Ok(ExitCode::SUCCESS);
        };

        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir().context("cannot determine the current directory")?,
        };
        let context = Context {
            root,
            git: self.git,
            output,
        };

        match command {
            Commands::Clone(args) => commands::clone::execute(&context, args),
            Commands::Pull(args) => commands::pull::execute(&context, args),
            Commands::Push(args) => commands::push::execute(&context, args),
            Commands::Rm(args) => commands::rm::execute(&context, args),
            Commands::List(args) => commands::list::execute(&context, args),
            Commands::Check(args) => commands::check::execute(&context, args),
            Commands::Restore(args) => commands::restore::execute(&context, args),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
