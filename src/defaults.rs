//! Default values for git-subdir configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Name of the registry file at the repository root.
pub const REGISTRY_FILENAME: &str = ".subdirs";

/// Name of the advisory lock file.
pub const LOCK_FILENAME: &str = "git-subdir.lock";

/// Environment variable overriding the repository root.
pub const ROOT_ENV: &str = "GIT_SUBDIR_ROOT";

/// Environment variable overriding the git executable.
pub const GIT_ENV: &str = "GIT_SUBDIR_GIT";

/// The git executable used when none is configured.
pub const DEFAULT_GIT: &str = "git";

/// Returns the path of the registry file for a repository root.
pub fn registry_path(root: &Path) -> PathBuf {
    root.join(REGISTRY_FILENAME)
}

/// Name of the lock file used when the root has no git directory.
pub const FALLBACK_LOCK_FILENAME: &str = ".subdirs.lock";

/// Returns the path of the advisory lock file for a repository root.
///
/// The lock lives in the git directory so it never shows up as an untracked
/// file. Worktrees and submodules have a `.git` file of the form
/// `gitdir: <path>`, which is followed. Without either, the lock is a
/// dotfile next to the registry.
pub fn lock_path(root: &Path) -> PathBuf {
    match git_dir(root) {
        Some(dir) => dir.join(LOCK_FILENAME),
        None => root.join(FALLBACK_LOCK_FILENAME),
    }
}

fn git_dir(root: &Path) -> Option<PathBuf> {
    let dot_git = root.join(".git");
    if dot_git.is_dir() {
        return Some(dot_git);
    }
    let content = std::fs::read_to_string(&dot_git).ok()?;
    let target = content.trim().strip_prefix("gitdir:")?.trim();
    let dir = root.join(target);
    dir.is_dir().then_some(dir)
}
