//! Vendored path normalisation
//!
//! Every vendored directory is identified by its location relative to the
//! repository root. Users type these in many shapes (`./vendor/lib`,
//! `vendor/lib/`, `vendor//lib`), so [`VendorPath`] reduces them to one
//! canonical `/`-separated form that is used as the registry key.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};

/// A normalised, repository-relative vendored directory path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VendorPath(String);

impl VendorPath {
    /// Normalise a user-supplied path.
    ///
    /// Rejects empty paths, absolute paths, `..` components, and anything
    /// under a `.git` directory. The result doubles as an INI section name,
    /// so brackets, control characters and components with surrounding
    /// whitespace are rejected too.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidPath {
            path: input.to_string(),
            message: message.to_string(),
        };

        let mut parts: Vec<String> = Vec::new();
        for component in Path::new(input).components() {
            match component {
                Component::Normal(part) => {
                    let part = part
                        .to_str()
                        .ok_or_else(|| invalid("path is not valid UTF-8"))?;
                    if part == ".git" {
                        return Err(invalid("path may not point into a .git directory"));
                    }
                    if part.chars().any(|c| c == '[' || c == ']' || c.is_control()) {
                        return Err(invalid("path may not contain brackets or control characters"));
                    }
                    if part.trim() != part {
                        return Err(invalid(
                            "path components may not start or end with whitespace",
                        ));
                    }
                    parts.push(part.to_string());
                }
                Component::CurDir => {}
                Component::ParentDir => {
                    return Err(invalid("path may not contain '..'"));
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("path must be relative to the repository root"));
                }
            }
        }

        if parts.is_empty() {
            return Err(invalid("path is empty"));
        }

        Ok(Self(parts.join("/")))
    }

    /// The canonical string form, as stored in the registry.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve this path against a repository root.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

impl fmt::Display for VendorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VendorPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
