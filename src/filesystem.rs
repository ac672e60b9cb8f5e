//! Local filesystem primitives for vendored trees

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Names of version control metadata entries stripped from vendored trees.
pub const METADATA_MARKERS: &[&str] = &[".git"];

fn is_marker(name: &std::ffi::OsStr) -> bool {
    METADATA_MARKERS.iter().any(|marker| name == *marker)
}

fn fs_error(operation: &str, path: &Path, e: impl std::fmt::Display) -> Error {
    Error::ExternalToolFailure {
        command: operation.to_string(),
        message: format!("{}: {}", path.display(), e),
    }
}

/// Delete `path` and everything below it. A missing path is not an error.
pub fn remove_tree(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(path).map_err(|e| fs_error("remove", path, e))
        }
        Ok(_) => fs::remove_file(path).map_err(|e| fs_error("remove", path, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(fs_error("remove", path, e)),
    }
}

/// Remove every version control metadata marker below `root`, at any depth.
///
/// Markers may be directories (a normal clone) or files (submodules and
/// worktrees point at their git directory through a `.git` file). Returns
/// the removed paths.
pub fn strip_metadata_markers(root: &Path) -> Result<Vec<PathBuf>> {
    let mut markers = Vec::new();
    let mut walker = WalkDir::new(root).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(|e| fs_error("walk", root, e))?;
        if is_marker(entry.file_name()) {
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            markers.push(entry.into_path());
        }
    }

    for marker in &markers {
        debug!("stripping {}", marker.display());
        remove_tree(marker)?;
    }
    Ok(markers)
}

/// Copy every file under `src` onto `dst`, replacing same-named files.
///
/// Symlinks are recreated as symlinks with the same target, never
/// followed. Files that exist only under `dst` are left alone, as are
/// metadata markers on either side. Returns the number of entries copied.
pub fn overlay_copy(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_marker(entry.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| fs_error("walk", src, e))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| fs_error("copy", entry.path(), e))?;
        let target = dst.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| fs_error("copy", &target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error("copy", parent, e))?;
        }
        // Replace rather than write through an existing symlink
        if fs::symlink_metadata(&target).is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(&target).map_err(|e| fs_error("copy", &target, e))?;
        }

        if file_type.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|e| fs_error("copy", entry.path(), e))?;
            remove_tree(&target)?;
            create_symlink(&link, &target).map_err(|e| fs_error("copy", &target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| fs_error("copy", &target, e))?;
        }
        copied += 1;
    }

    debug!("copied {} files from {} to {}", copied, src.display(), dst.display());
    Ok(copied)
}

#[cfg(unix)]
fn create_symlink(link: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link, target)
}

#[cfg(windows)]
fn create_symlink(link: &Path, target: &Path) -> io::Result<()> {
    let resolved = target.parent().map(|p| p.join(link)).unwrap_or_default();
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(link, target)
    } else {
        std::os::windows::fs::symlink_file(link, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_remove_tree_directory_and_missing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "lib/a/b.txt", "x");
        remove_tree(&temp.path().join("lib")).unwrap();
        assert!(!temp.path().join("lib").exists());
        remove_tree(&temp.path().join("lib")).unwrap();
    }

    #[test]
    fn test_strip_metadata_markers_nested() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("lib");
        write(&root, ".git/config", "[core]");
        write(&root, ".git/objects/ab/cdef", "blob");
        write(&root, "src/main.c", "int main;");
        write(&root, "deps/inner/.git", "gitdir: ../../.git/modules/inner");
        write(&root, "deps/inner/inner.c", "");
        write(&root, ".gitignore", "*.o");

        let removed = strip_metadata_markers(&root).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!root.join(".git").exists());
        assert!(!root.join("deps/inner/.git").exists());
        assert!(root.join("src/main.c").exists());
        assert!(root.join("deps/inner/inner.c").exists());
        // only exact marker names are stripped
        assert!(root.join(".gitignore").exists());

        let leftover = WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name() == ".git");
        assert!(!leftover);
    }

    #[test]
    fn test_overlay_copy_replaces_and_keeps_extra_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "README", "new readme");
        write(&src, "lib/util.c", "new util");
        write(&dst, "README", "old readme");
        write(&dst, "only-in-dst.txt", "keep");
        write(&dst, ".git/HEAD", "ref: refs/heads/main");

        let copied = overlay_copy(&src, &dst).unwrap();
        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(dst.join("README")).unwrap(), "new readme");
        assert_eq!(fs::read_to_string(dst.join("lib/util.c")).unwrap(), "new util");
        assert_eq!(fs::read_to_string(dst.join("only-in-dst.txt")).unwrap(), "keep");
        assert_eq!(
            fs::read_to_string(dst.join(".git/HEAD")).unwrap(),
            "ref: refs/heads/main"
        );
    }

    #[test]
    fn test_overlay_copy_skips_source_markers() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, ".git/HEAD", "bogus");
        write(&src, "file", "content");
        write(&dst, ".git/HEAD", "ref: refs/heads/main");

        overlay_copy(&src, &dst).unwrap();
        assert_eq!(
            fs::read_to_string(dst.join(".git/HEAD")).unwrap(),
            "ref: refs/heads/main"
        );
    }

    #[test]
    fn test_overlay_copy_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "a/b/c.txt", "c");
        write(&src, "d.txt", "d");
        fs::create_dir_all(&dst).unwrap();

        overlay_copy(&src, &dst).unwrap();
        let first: Vec<_> = snapshot(&dst);
        overlay_copy(&src, &dst).unwrap();
        assert_eq!(first, snapshot(&dst));
    }

    #[cfg(unix)]
    #[test]
    fn test_overlay_copy_recreates_symlinks() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        write(&src, "docs/guide.md", "guide");
        write(&src, "real.txt", "real");
        symlink("docs", src.join("docs-link")).unwrap();
        symlink("real.txt", src.join("file-link")).unwrap();
        write(&dst, "file-link", "stale regular file");

        let copied = overlay_copy(&src, &dst).unwrap();
        assert_eq!(copied, 4);

        let dir_link = fs::symlink_metadata(dst.join("docs-link")).unwrap();
        assert!(dir_link.file_type().is_symlink());
        assert_eq!(fs::read_link(dst.join("docs-link")).unwrap(), PathBuf::from("docs"));

        let file_link = fs::symlink_metadata(dst.join("file-link")).unwrap();
        assert!(file_link.file_type().is_symlink());
        assert_eq!(fs::read_to_string(dst.join("file-link")).unwrap(), "real");

        // a second overlay replaces the links in place
        overlay_copy(&src, &dst).unwrap();
        assert_eq!(fs::read_link(dst.join("file-link")).unwrap(), PathBuf::from("real.txt"));
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
        let mut files: Vec<_> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let content = fs::read(e.path()).unwrap();
                (e.path().strip_prefix(root).unwrap().to_path_buf(), content)
            })
            .collect();
        files.sort();
        files
    }
}
