//! # Reconciliation Engine
//!
//! [`VendorManager`] implements the vendoring operations on top of a
//! [`RegistryStore`] and the [`VcsOperations`] / [`FilesystemOperations`]
//! collaborators. Every mutating operation runs in three phases:
//!
//! 1. **Precheck**: validate the repository root, the registry and the
//!    filesystem. Nothing has been touched if this fails.
//! 2. **Act**: run the external side effects (clone, checkout, delete,
//!    copy, stage). A failure here is reported as-is and may leave the
//!    working tree partially modified; nothing is rolled back.
//! 3. **Commit**: write the registry.
//!
//! The repository root is checked first, without touching the disk. The rest
//! of the sequence runs under a [`RepositoryLock`], and the registry is
//! reloaded after the lock is taken so decisions are never made on a stale
//! view. Between operations a directory exists if and only if it has a
//! registry entry; prechecks refuse to proceed when that does not hold.
//!
//! | Operation    | CLI        | Registry effect            |
//! |--------------|------------|----------------------------|
//! | `register`   | `clone`    | entry created              |
//! | `refresh`    | `pull`     | revision replaced, url kept|
//! | `export`     | `push`     | none                       |
//! | `deregister` | `rm`       | entry deleted              |
//! | `restore`    | `restore`  | none (directory rebuilt)   |

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::lock::RepositoryLock;
use crate::path::VendorPath;
use crate::registry::{self, IniRegistry, RegistryStore, VendorEntry};
use crate::repository::{
    DefaultFilesystemOperations, DefaultVcsOperations, FilesystemOperations, VcsOperations,
};
use crate::revision::Revision;

/// Result of an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub entry: VendorEntry,
    pub destination: PathBuf,
    pub files_copied: usize,
}

/// The main entry point for managing vendored directories of one repository.
pub struct VendorManager {
    root: PathBuf,
    registry: Box<dyn RegistryStore>,
    vcs: Box<dyn VcsOperations>,
    fs: Box<dyn FilesystemOperations>,
}

impl VendorManager {
    /// Open the repository at `root` with the `.subdirs` registry and the
    /// given `git` executable.
    pub fn open(root: &Path, git_program: &Path) -> Result<Self> {
        let registry = IniRegistry::open(root)?;
        Ok(Self::with_operations(
            root,
            Box::new(registry),
            Box::new(DefaultVcsOperations::new(git_program)),
            Box::new(DefaultFilesystemOperations),
        ))
    }

    /// Create a manager with custom collaborators.
    ///
    /// This is primarily used for testing to inject fakes.
    pub fn with_operations(
        root: &Path,
        registry: Box<dyn RegistryStore>,
        vcs: Box<dyn VcsOperations>,
        fs: Box<dyn FilesystemOperations>,
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            registry,
            vcs,
            fs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read-only view of the registry.
    pub fn registry(&self) -> &dyn RegistryStore {
        self.registry.as_ref()
    }

    pub fn lookup(&self, path: &VendorPath) -> Option<VendorEntry> {
        self.registry.lookup(path)
    }

    /// Vendor `url` into `path`, at `revision` or the default branch tip.
    ///
    /// The registry records the revision actually checked out, never the
    /// symbolic name that was asked for.
    pub fn register(
        &mut self,
        path: &VendorPath,
        url: &str,
        revision: Option<&str>,
    ) -> Result<VendorEntry> {
        self.ensure_repository_root()?;
        let _lock = self.lock()?;
        self.register_locked(path, url, revision)
    }

    /// Replace the content of `path` with its source at `revision` (or the
    /// default branch tip). The source location is kept.
    ///
    /// If `expected_url` is given it must match the recorded source.
    pub fn refresh(
        &mut self,
        path: &VendorPath,
        revision: Option<&str>,
        expected_url: Option<&str>,
    ) -> Result<VendorEntry> {
        self.ensure_repository_root()?;
        let _lock = self.lock()?;

        let entry = self.require_entry(path)?;
        self.ensure_directory_present(path)?;
        self.ensure_clean(&path.to_native(&self.root), path.as_str())?;
        if let Some(expected) = expected_url {
            if expected != entry.source_location {
                return Err(Error::PreconditionViolation {
                    path: path.to_string(),
                    message: format!(
                        "was cloned from {}, not {}",
                        entry.source_location, expected
                    ),
                    hint: Some(
                        "remove it and clone again to change the source location".to_string(),
                    ),
                });
            }
        }

        info!(
            "refreshing {} from {} (was {})",
            path,
            entry.source_location,
            entry.pinned_revision.short()
        );
        self.deregister_locked(path)?;
        self.register_locked(path, &entry.source_location, revision)
            .inspect_err(|_| {
                warn!(
                    "{} was removed but could not be fetched again; restore it with \
                     `git-subdir clone {} {} {}`",
                    path, path, entry.source_location, entry.pinned_revision
                );
            })
    }

    /// Copy the vendored content of `path` onto a local checkout of its
    /// source at `destination`, after moving that checkout to the pinned
    /// revision.
    ///
    /// Files that exist only at the destination are not deleted.
    pub fn export(&mut self, path: &VendorPath, destination: &Path) -> Result<ExportReport> {
        self.ensure_repository_root()?;
        let _lock = self.lock()?;

        if !self.fs.exists(destination) {
            return Err(Error::precondition(
                destination.display().to_string(),
                "destination does not exist",
            ));
        }
        let entry = self.require_entry(path)?;
        self.ensure_directory_present(path)?;
        let source = path.to_native(&self.root);
        self.ensure_clean(&source, path.as_str())?;
        self.ensure_clean(destination, &destination.display().to_string())?;

        info!(
            "exporting {} to {} at {}",
            path,
            destination.display(),
            entry.pinned_revision.short()
        );
        self.vcs
            .checkout(destination, entry.pinned_revision.as_str())
            .map_err(|e| match e {
                Error::ExternalToolFailure { message, .. } => {
                    debug!("checkout at destination failed: {}", message);
                    Error::RevisionMismatch {
                        revision: entry.pinned_revision.to_string(),
                        destination: destination.display().to_string(),
                    }
                }
                other => other,
            })?;
        let files_copied = self.fs.recursive_copy(&source, destination)?;

        Ok(ExportReport {
            entry,
            destination: destination.to_path_buf(),
            files_copied,
        })
    }

    /// Delete the vendored directory at `path` and its registry entry.
    ///
    /// An entry whose directory has already disappeared is simply dropped,
    /// which brings the registry back in line with the filesystem.
    pub fn deregister(&mut self, path: &VendorPath) -> Result<VendorEntry> {
        self.ensure_repository_root()?;
        let _lock = self.lock()?;

        let entry = self.require_entry(path)?;
        if self.fs.exists(&path.to_native(&self.root)) {
            self.ensure_clean(&path.to_native(&self.root), path.as_str())?;
        } else {
            warn!("{} is registered but missing on disk; dropping the entry", path);
        }

        self.deregister_locked(path)?;
        self.stage_registry()?;
        Ok(entry)
    }

    /// Rebuild a registered directory that has gone missing, from the
    /// recorded source location and pinned revision.
    pub fn restore(&mut self, path: &VendorPath) -> Result<VendorEntry> {
        self.ensure_repository_root()?;
        let _lock = self.lock()?;

        let entry = self.require_entry(path)?;
        if self.fs.exists(&path.to_native(&self.root)) {
            return Err(Error::precondition(
                path.as_str(),
                "is present on disk; nothing to restore",
            ));
        }

        info!("restoring {} at {}", path, entry.pinned_revision.short());
        let resolved = self.materialize(
            path,
            &entry.source_location,
            Some(entry.pinned_revision.as_str()),
        )?;
        if resolved == entry.pinned_revision {
            return Ok(entry);
        }

        // A hand-edited registry may hold an abbreviated hash
        let restored = VendorEntry::new(path.clone(), entry.source_location, resolved);
        self.registry.upsert(restored.clone())?;
        self.stage_registry()?;
        Ok(restored)
    }

    /// Registered entries whose directory is missing on disk.
    pub fn verify(&self) -> Vec<VendorEntry> {
        self.registry
            .entries()
            .into_iter()
            .filter(|entry| !self.fs.exists(&entry.path.to_native(&self.root)))
            .collect()
    }

    fn lock(&mut self) -> Result<RepositoryLock> {
        let lock = RepositoryLock::acquire(&self.root)?;
        self.registry.reload()?;
        Ok(lock)
    }

    fn register_locked(
        &mut self,
        path: &VendorPath,
        url: &str,
        revision: Option<&str>,
    ) -> Result<VendorEntry> {
        if self.fs.exists(&path.to_native(&self.root)) {
            return Err(Error::precondition(path.as_str(), "is already cloned"));
        }
        if self.registry.lookup(path).is_some() {
            return Err(Error::PreconditionViolation {
                path: path.to_string(),
                message: "is already registered but missing on disk".to_string(),
                hint: Some(format!(
                    "run `git-subdir restore {}` or `git-subdir rm {}`",
                    path, path
                )),
            });
        }
        if url.trim().is_empty() {
            return Err(Error::precondition(path.as_str(), "source location is empty"));
        }
        if !registry::is_storable_url(url) {
            return Err(Error::precondition(
                path.as_str(),
                format!("source location '{}' cannot be recorded in .subdirs", url),
            ));
        }
        if revision.is_some_and(|r| r.trim().is_empty()) {
            return Err(Error::precondition(path.as_str(), "revision is empty"));
        }
        if let Some(revision) = revision.filter(|r| r.starts_with('-')) {
            return Err(Error::precondition(
                path.as_str(),
                format!("revision '{}' looks like an option", revision),
            ));
        }

        info!("cloning {} into {}", url, path);
        let resolved = self.materialize(path, url, revision)?;

        let entry = VendorEntry::new(path.clone(), url, resolved);
        self.registry.upsert(entry.clone())?;
        self.stage_registry()?;
        Ok(entry)
    }

    /// Act phase of register: fetch, pin, flatten and stage. Returns the
    /// revision that ended up checked out.
    fn materialize(
        &mut self,
        path: &VendorPath,
        url: &str,
        revision: Option<&str>,
    ) -> Result<Revision> {
        let target = path.to_native(&self.root);

        self.vcs.clone_repository(url, &target)?;
        if let Some(revision) = revision {
            self.vcs.checkout(&target, revision)?;
        }
        let resolved = self.vcs.resolve_head(&target)?;
        debug!("{} resolved to {}", revision.unwrap_or("default branch"), resolved);

        self.vcs.init_nested_references(&target)?;
        let stripped = self.fs.remove_metadata_markers(&target)?;
        debug!("stripped {} metadata markers from {}", stripped.len(), path);

        self.vcs.stage(&self.root, &[path.as_str()])?;
        Ok(resolved)
    }

    /// Act + commit of deregister, without prechecks.
    fn deregister_locked(&mut self, path: &VendorPath) -> Result<()> {
        let target = path.to_native(&self.root);
        if self.fs.exists(&target) {
            info!("removing {}", path);
            self.fs.recursive_delete(&target)?;
        }
        self.registry.remove(path)?;
        self.vcs.stage_removal(&self.root, path.as_str())
    }

    fn stage_registry(&self) -> Result<()> {
        match self.registry.file_name() {
            Some(name) => self.vcs.stage(&self.root, &[name]),
            None => Ok(()),
        }
    }

    fn require_entry(&self, path: &VendorPath) -> Result<VendorEntry> {
        self.registry.lookup(path).ok_or_else(|| Error::NotFound {
            path: path.to_string(),
        })
    }

    fn ensure_directory_present(&self, path: &VendorPath) -> Result<()> {
        if self.fs.exists(&path.to_native(&self.root)) {
            return Ok(());
        }
        Err(Error::PreconditionViolation {
            path: path.to_string(),
            message: "is registered but missing on disk".to_string(),
            hint: Some(format!("run `git-subdir restore {}` first", path)),
        })
    }

    fn ensure_clean(&self, dir: &Path, label: &str) -> Result<()> {
        if self.vcs.status_is_clean(dir)? {
            return Ok(());
        }
        Err(Error::PreconditionViolation {
            path: label.to_string(),
            message: "has modified or untracked files".to_string(),
            hint: Some("commit, stash or remove them first".to_string()),
        })
    }

    /// The configured root must be the top level of its working tree.
    fn ensure_repository_root(&self) -> Result<()> {
        let not_root = |message: String| Error::precondition(self.root.display().to_string(), message);

        let toplevel = self
            .vcs
            .toplevel(&self.root)
            .map_err(|e| not_root(format!("is not inside a git working tree ({})", e)))?;

        let same = match (fs::canonicalize(&self.root), fs::canonicalize(&toplevel)) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.root == toplevel,
        };
        if !same {
            return Err(Error::PreconditionViolation {
                path: self.root.display().to_string(),
                message: format!(
                    "is not the repository root (the root is {})",
                    toplevel.display()
                ),
                hint: Some("run from the top of the repository or pass --root".to_string()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Fails every side effect and counts how many were attempted.
    struct RefusingVcs {
        attempts: Rc<Cell<usize>>,
    }

    impl RefusingVcs {
        fn refuse<T>(&self) -> Result<T> {
            self.attempts.set(self.attempts.get() + 1);
            Err(Error::ExternalToolFailure {
                command: "git".to_string(),
                message: "refused".to_string(),
            })
        }
    }

    impl VcsOperations for RefusingVcs {
        fn clone_repository(&self, _url: &str, _destination: &Path) -> Result<()> {
            self.refuse()
        }
        fn checkout(&self, _worktree: &Path, _revision: &str) -> Result<()> {
            self.refuse()
        }
        fn resolve_head(&self, _worktree: &Path) -> Result<Revision> {
            self.refuse()
        }
        fn status_is_clean(&self, _dir: &Path) -> Result<bool> {
            Ok(true)
        }
        fn init_nested_references(&self, _worktree: &Path) -> Result<()> {
            self.refuse()
        }
        fn stage(&self, _root: &Path, _paths: &[&str]) -> Result<()> {
            self.refuse()
        }
        fn stage_removal(&self, _root: &Path, _path: &str) -> Result<()> {
            self.refuse()
        }
        fn toplevel(&self, dir: &Path) -> Result<PathBuf> {
            Ok(dir.to_path_buf())
        }
    }

    fn manager(root: &Path, registry: MemoryRegistry) -> (VendorManager, Rc<Cell<usize>>) {
        let attempts = Rc::new(Cell::new(0));
        let manager = VendorManager::with_operations(
            root,
            Box::new(registry),
            Box::new(RefusingVcs {
                attempts: Rc::clone(&attempts),
            }),
            Box::new(DefaultFilesystemOperations),
        );
        (manager, attempts)
    }

    fn lib() -> VendorPath {
        VendorPath::parse("vendor/lib").unwrap()
    }

    fn entry() -> VendorEntry {
        VendorEntry::new(lib(), "https://example.com/lib.git", Revision::parse("abc123").unwrap())
    }

    #[test]
    fn test_prechecks_run_before_side_effects() {
        let temp = TempDir::new().unwrap();
        let (mut manager, attempts) = manager(temp.path(), MemoryRegistry::new(temp.path()));

        assert!(matches!(manager.deregister(&lib()), Err(Error::NotFound { .. })));
        assert!(matches!(manager.refresh(&lib(), None, None), Err(Error::NotFound { .. })));
        assert!(manager.register(&lib(), "  ", None).unwrap_err().is_precondition());
        assert!(manager
            .register(&lib(), "https://example.com/lib.git", Some(""))
            .unwrap_err()
            .is_precondition());
        assert_eq!(attempts.get(), 0);
    }

    #[test]
    fn test_register_side_effect_failure_leaves_registry_alone() {
        let temp = TempDir::new().unwrap();
        let (mut manager, attempts) = manager(temp.path(), MemoryRegistry::new(temp.path()));

        let err = manager
            .register(&lib(), "https://example.com/lib.git", None)
            .unwrap_err();
        assert!(matches!(err, Error::ExternalToolFailure { .. }));
        assert_eq!(attempts.get(), 1);
        assert!(manager.lookup(&lib()).is_none());
    }

    #[test]
    fn test_verify_lists_missing_directories() {
        let temp = TempDir::new().unwrap();
        let mut registry = MemoryRegistry::new(temp.path());
        registry.upsert(entry()).unwrap();
        let (manager, _) = manager(temp.path(), registry);

        assert_eq!(manager.verify(), vec![entry()]);

        std::fs::create_dir_all(temp.path().join("vendor/lib")).unwrap();
        assert!(manager.verify().is_empty());
    }

    #[test]
    fn test_export_requires_existing_destination() {
        let temp = TempDir::new().unwrap();
        let mut registry = MemoryRegistry::new(temp.path());
        registry.upsert(entry()).unwrap();
        let (mut manager, attempts) = manager(temp.path(), registry);

        let err = manager
            .export(&lib(), &temp.path().join("missing"))
            .unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(attempts.get(), 0);
    }
}
