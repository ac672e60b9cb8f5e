//! Thin wrappers around the system `git` command
//!
//! Every function here spawns one `git` process and turns its exit status
//! into a [`Result`]. Using the system binary means SSH keys, credential
//! helpers and `~/.gitconfig` settings apply exactly as they would for the
//! user's own `git` invocations.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};
use crate::revision::Revision;

/// Run `git [-C <dir>] <args>` and return its output if it exited successfully.
fn run<I, S>(program: &Path, dir: Option<&Path>, label: &str, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    if let Some(dir) = dir {
        command.arg("-C").arg(dir);
    }
    command.args(args);
    debug!("running {:?}", command);

    let output = command.output().map_err(|e| Error::ExternalToolFailure {
        command: label.to_string(),
        message: format!("could not run {}: {}", program.display(), e),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ExternalToolFailure {
            command: label.to_string(),
            message: stderr.trim().to_string(),
        });
    }

    Ok(output)
}

/// Clone the full history of `url` into `target_dir`.
///
/// The parent of `target_dir` is created if needed; `target_dir` itself
/// must not exist. A relative local `url` is resolved against the current
/// directory, as `git clone` itself would.
pub fn clone_full(program: &Path, url: &str, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    let result = run(
        program,
        None,
        "git clone",
        [
            OsStr::new("clone"),
            OsStr::new("--quiet"),
            OsStr::new("--"),
            OsStr::new(url),
            target_dir.as_os_str(),
        ],
    );

    // Add a pointer for the usual authentication failures
    match result {
        Err(Error::ExternalToolFailure { command, message })
            if message.contains("Authentication failed")
                || message.contains("Permission denied")
                || message.contains("Could not read from remote repository") =>
        {
            Err(Error::ExternalToolFailure {
                command,
                message: format!(
                    "{}\nMake sure you have access to {}: check your SSH agent, \
                     credential helper or access token.",
                    message, url
                ),
            })
        }
        other => other.map(|_| ()),
    }
}

/// Move the working copy at `worktree` to `revision` (hash, branch or tag).
pub fn checkout(program: &Path, worktree: &Path, revision: &str) -> Result<()> {
    run(
        program,
        Some(worktree),
        "git checkout",
        ["checkout", "--quiet", revision],
    )?;
    Ok(())
}

/// Resolve `HEAD` of `worktree` to a full revision identifier.
pub fn resolve_head(program: &Path, worktree: &Path) -> Result<Revision> {
    let output = run(program, Some(worktree), "git rev-parse", ["rev-parse", "HEAD"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Revision::parse(stdout.trim())
}

/// Returns `true` when git reports no modified or untracked files under `dir`.
///
/// Staged changes do not count: a freshly vendored directory that has not
/// been committed yet is clean.
pub fn is_clean(program: &Path, dir: &Path) -> Result<bool> {
    let output = run(
        program,
        Some(dir),
        "git ls-files",
        [
            "ls-files",
            "--modified",
            "--others",
            "--exclude-standard",
            "--",
            ".",
        ],
    )?;
    Ok(output.stdout.iter().all(|b| b.is_ascii_whitespace()))
}

/// Initialise and fetch all nested submodules of `worktree`.
pub fn update_submodules(program: &Path, worktree: &Path) -> Result<()> {
    run(
        program,
        Some(worktree),
        "git submodule update",
        ["submodule", "update", "--init", "--recursive", "--quiet"],
    )?;
    Ok(())
}

/// Stage additions, modifications and deletions under `paths`.
pub fn add_all(program: &Path, root: &Path, paths: &[&str]) -> Result<()> {
    let mut args = vec!["add", "-A", "--"];
    args.extend_from_slice(paths);
    run(program, Some(root), "git add", args)?;
    Ok(())
}

/// Drop every index entry under `path`, tolerating paths git never tracked.
pub fn remove_cached(program: &Path, root: &Path, path: &str) -> Result<()> {
    run(
        program,
        Some(root),
        "git rm",
        ["rm", "-r", "-q", "--cached", "--ignore-unmatch", "--", path],
    )?;
    Ok(())
}

/// Top level of the working tree containing `dir`.
pub fn toplevel(program: &Path, dir: &Path) -> Result<PathBuf> {
    let output = run(
        program,
        Some(dir),
        "git rev-parse",
        ["rev-parse", "--show-toplevel"],
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(PathBuf::from(stdout.trim()))
}
