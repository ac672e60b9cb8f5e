//! # External Collaborators
//!
//! The reconciliation engine never spawns processes or touches the disk
//! directly for its side effects. It goes through two traits:
//!
//! - **`VcsOperations`**: the version control tool (clone, checkout,
//!   resolving `HEAD`, cleanliness, nested references, staging).
//! - **`FilesystemOperations`**: existence checks, recursive delete,
//!   overlay copy and stripping of metadata markers.
//!
//! `DefaultVcsOperations` and `DefaultFilesystemOperations` wrap the system
//! `git` binary and the local filesystem. Tests substitute recording fakes so
//! every operation can be exercised without a network or a real `git`.

use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::Result;
use crate::filesystem;
use crate::git;
use crate::revision::Revision;

/// Trait for version control operations - allows mocking in tests
pub trait VcsOperations {
    /// Fetch the full history of `url` into `destination`.
    fn clone_repository(&self, url: &str, destination: &Path) -> Result<()>;

    /// Move the working copy at `worktree` to a revision, branch or tag.
    fn checkout(&self, worktree: &Path, revision: &str) -> Result<()>;

    /// The exact revision currently checked out at `worktree`.
    fn resolve_head(&self, worktree: &Path) -> Result<Revision>;

    /// Whether `dir` has no modified or untracked files.
    fn status_is_clean(&self, dir: &Path) -> Result<bool>;

    /// Materialise every nested reference declared by the content at `worktree`.
    fn init_nested_references(&self, worktree: &Path) -> Result<()>;

    /// Stage the current state of `paths` (relative to `root`) for the next commit.
    fn stage(&self, root: &Path, paths: &[&str]) -> Result<()>;

    /// Stage the removal of everything under `path` (relative to `root`).
    fn stage_removal(&self, root: &Path, path: &str) -> Result<()>;

    /// Top level of the working tree that contains `dir`.
    fn toplevel(&self, dir: &Path) -> Result<PathBuf>;
}

/// Trait for filesystem operations - allows mocking in tests
pub trait FilesystemOperations {
    fn exists(&self, path: &Path) -> bool;

    fn recursive_delete(&self, path: &Path) -> Result<()>;

    /// Copy all files from `src` onto `dst`, replacing same-named files.
    fn recursive_copy(&self, src: &Path, dst: &Path) -> Result<usize>;

    /// Remove embedded version control metadata below `root`.
    fn remove_metadata_markers(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// The default implementation of `VcsOperations`, which runs the system's
/// `git` command.
#[derive(Debug, Clone)]
pub struct DefaultVcsOperations {
    program: PathBuf,
}

impl DefaultVcsOperations {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for DefaultVcsOperations {
    fn default() -> Self {
        Self::new(defaults::DEFAULT_GIT)
    }
}

impl VcsOperations for DefaultVcsOperations {
    fn clone_repository(&self, url: &str, destination: &Path) -> Result<()> {
        git::clone_full(&self.program, url, destination)
    }

    fn checkout(&self, worktree: &Path, revision: &str) -> Result<()> {
        git::checkout(&self.program, worktree, revision)
    }

    fn resolve_head(&self, worktree: &Path) -> Result<Revision> {
        git::resolve_head(&self.program, worktree)
    }

    fn status_is_clean(&self, dir: &Path) -> Result<bool> {
        git::is_clean(&self.program, dir)
    }

    fn init_nested_references(&self, worktree: &Path) -> Result<()> {
        git::update_submodules(&self.program, worktree)
    }

    fn stage(&self, root: &Path, paths: &[&str]) -> Result<()> {
        git::add_all(&self.program, root, paths)
    }

    fn stage_removal(&self, root: &Path, path: &str) -> Result<()> {
        git::remove_cached(&self.program, root, path)
    }

    fn toplevel(&self, dir: &Path) -> Result<PathBuf> {
        git::toplevel(&self.program, dir)
    }
}

/// The default implementation of `FilesystemOperations`, backed by the
/// host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilesystemOperations;

impl FilesystemOperations for DefaultFilesystemOperations {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn recursive_delete(&self, path: &Path) -> Result<()> {
        filesystem::remove_tree(path)
    }

    fn recursive_copy(&self, src: &Path, dst: &Path) -> Result<usize> {
        filesystem::overlay_copy(src, dst)
    }

    fn remove_metadata_markers(&self, root: &Path) -> Result<Vec<PathBuf>> {
        filesystem::strip_metadata_markers(root)
    }
}
