//! Shared test utilities for the CLI end-to-end tests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("README", "host");
//!     fixture.command().arg("list").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, git_stdout, init_git_repo, Upstream};
    pub use super::TestFixture;
}

/// Run `git` in `dir`, panicking with its stderr on failure.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run `git` in `dir` and return its trimmed stdout.
#[allow(dead_code)]
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(output.status.success(), "git {:?} failed", args);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Initialize a git repository on branch `main` with an identity and
/// signing disabled, so commits work on any machine.
#[allow(dead_code)]
pub fn init_git_repo(dir: &Path) {
    git(dir, &["init", "-q", "-b", "main"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// An upstream repository with two commits on `main`.
///
/// The first commit has `README` ("v1") and `old.txt`; the second changes
/// `README` to "v2", deletes `old.txt` and adds `test/test2.js`.
#[allow(dead_code)]
pub struct Upstream {
    dir: assert_fs::TempDir,
    pub first: String,
    pub second: String,
}

#[allow(dead_code)]
impl Upstream {
    pub fn new() -> Self {
        let dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        init_git_repo(dir.path());

        dir.child("README").write_str("v1\n").unwrap();
        dir.child("old.txt").write_str("only in v1\n").unwrap();
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "first"]);
        let first = git_stdout(dir.path(), &["rev-parse", "HEAD"]);

        dir.child("README").write_str("v2\n").unwrap();
        dir.child("test/test2.js").write_str("// v2\n").unwrap();
        git(dir.path(), &["rm", "-q", "old.txt"]);
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "second"]);
        let second = git_stdout(dir.path(), &["rev-parse", "HEAD"]);

        Self { dir, first, second }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The upstream location as passed to `git-subdir clone`.
    pub fn url(&self) -> String {
        self.dir.path().display().to_string()
    }
}

/// A temporary host directory for running `git-subdir` in.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_registry("[vendor/lib]\npath = vendor/lib\n...");
///
/// fixture.command().arg("check").assert().code(1);
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Turn the fixture into a git working tree.
    #[allow(dead_code)]
    pub fn with_git(self) -> Self {
        init_git_repo(self.path());
        self
    }

    /// Write a `.subdirs` registry with the given content.
    #[allow(dead_code)]
    pub fn with_registry(self, content: &str) -> Self {
        self.temp_dir
            .child(".subdirs")
            .write_str(content)
            .expect("Failed to write registry");
        self
    }

    /// Add a file with the given path and content.
    #[allow(dead_code)]
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Contents of the registry file, or an empty string if it is absent.
    #[allow(dead_code)]
    pub fn registry(&self) -> String {
        std::fs::read_to_string(self.path().join(".subdirs")).unwrap_or_default()
    }

    /// Create a command configured to run in this fixture's directory.
    ///
    /// Colors are disabled and the root/git environment overrides are
    /// cleared so the host environment cannot leak in.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("git-subdir");
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env_remove("GIT_SUBDIR_ROOT")
            .env_remove("GIT_SUBDIR_GIT");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_registry() {
        let fixture = TestFixture::new().with_registry("[a]\n");
        assert_eq!(fixture.registry(), "[a]\n");
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("dir/test.txt", "hello");
        assert!(fixture.path().join("dir/test.txt").exists());
    }
}
