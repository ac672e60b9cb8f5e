//! Advisory lock scoped to a repository root
//!
//! Mutating operations hold a [`RepositoryLock`] from their first check to
//! their last registry write. The lock is an OS advisory lock on a file, so
//! it is released when the guard is dropped and also when the process dies.
//! A lock file created outside any git directory is deleted on release so
//! it never lingers as an untracked file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::debug;

use crate::defaults;
use crate::error::{Error, Result};

/// Held exclusive lock; released on drop.
#[derive(Debug)]
pub struct RepositoryLock {
    file: File,
    path: PathBuf,
    remove_on_drop: bool,
}

impl RepositoryLock {
    /// Take the lock for `root` without waiting.
    ///
    /// Fails with `Locked` if another process holds it.
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = defaults::lock_path(root);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        file.try_lock_exclusive().map_err(|_| Error::Locked {
            lock: path.display().to_string(),
        })?;

        debug!("acquired {}", path.display());
        let remove_on_drop = path == root.join(defaults::FALLBACK_LOCK_FILENAME);
        Ok(Self {
            file,
            path,
            remove_on_drop,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepositoryLock {
    fn drop(&mut self) {
        if self.remove_on_drop {
            let _ = std::fs::remove_file(&self.path);
        }
        let _ = self.file.unlock();
        debug!("released {}", self.path.display());
    }
}
