//! # Registry Store
//!
//! The registry is the durable record of which directories in the host
//! repository are vendored, where their content came from, and which
//! revision it corresponds to. It lives in `.subdirs` at the repository
//! root as an INI-style file with one section per vendored path:
//!
//! ```text
//! [vendor/lib]
//! path=vendor/lib
//! url=https://example.com/lib.git
//! basecommit=3f1c0e9a7d2b4c5e6f708192a3b4c5d6e7f80912
//! ```
//!
//! A line-oriented text format keeps the file reviewable and lets ordinary
//! text merges reconcile edits made on different branches.
//!
//! ## Store implementations
//!
//! - **`IniRegistry`**: backed by the `.subdirs` file. Every mutation is
//!   written through to disk with a write-to-temporary-then-rename so the
//!   three fields of an entry always land together.
//! - **`MemoryRegistry`**: an in-memory store with the same semantics, used
//!   by tests and by callers that persist entries elsewhere.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ini::{Ini, Properties};
use log::{debug, warn};
use serde::Serialize;

use crate::defaults;
use crate::error::{Error, Result};
use crate::path::VendorPath;
use crate::revision::Revision;

const KEY_PATH: &str = "path";
const KEY_URL: &str = "url";
const KEY_BASECOMMIT: &str = "basecommit";

/// One vendored directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorEntry {
    pub path: VendorPath,
    #[serde(rename = "url")]
    pub source_location: String,
    #[serde(rename = "basecommit")]
    pub pinned_revision: Revision,
}

impl VendorEntry {
    pub fn new(path: VendorPath, source_location: impl Into<String>, pinned_revision: Revision) -> Self {
        Self {
            path,
            source_location: source_location.into(),
            pinned_revision,
        }
    }
}

/// Persistence of [`VendorEntry`] records keyed by path.
///
/// Implementations do not check that a directory exists before `upsert`;
/// that is the caller's job. `remove` does check that it is gone.
pub trait RegistryStore {
    /// Find the entry for `path`. Absence is a normal outcome.
    fn lookup(&self, path: &VendorPath) -> Option<VendorEntry>;

    /// All entries, in file order.
    fn entries(&self) -> Vec<VendorEntry>;

    /// Write all three fields for `entry.path`, replacing any previous entry.
    fn upsert(&mut self, entry: VendorEntry) -> Result<()>;

    /// Delete the entry for `path`.
    ///
    /// Fails with `NotFound` if there is no entry and with
    /// `InvariantViolation` if the directory is still on disk.
    fn remove(&mut self, path: &VendorPath) -> Result<()>;

    /// Re-read persisted state, discarding the in-memory view.
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }

    /// Where the registry is persisted, relative to the repository root,
    /// if it is persisted at all.
    fn file_name(&self) -> Option<&str> {
        None
    }
}

fn ensure_directory_absent(root: &Path, path: &VendorPath) -> Result<()> {
    if path.to_native(root).exists() {
        return Err(Error::InvariantViolation {
            path: path.to_string(),
            message: "directory still exists; delete it before removing its registry entry"
                .to_string(),
        });
    }
    Ok(())
}

/// Registry backed by the `.subdirs` file at the repository root.
#[derive(Debug, Clone)]
pub struct IniRegistry {
    root: PathBuf,
    file: PathBuf,
    document: Ini,
}

impl IniRegistry {
    /// Load the registry for `root`. A missing file is an empty registry.
    ///
    /// Every section is validated up front so later lookups cannot fail.
    pub fn open(root: &Path) -> Result<Self> {
        let file = defaults::registry_path(root);
        let read_error = |message: String| Error::ConfigRead {
            path: file.display().to_string(),
            message,
        };

        let document = match fs::read_to_string(&file) {
            Ok(content) => Ini::load_from_str(&content).map_err(|e| read_error(e.to_string()))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no registry at {}, starting empty", file.display());
                Ini::new()
            }
            Err(e) => return Err(read_error(e.to_string())),
        };

        for (section, properties) in document.iter() {
            match section {
                Some(name) => {
                    entry_from_section(name, properties).map_err(read_error)?;
                    for (key, _) in properties.iter() {
                        if ![KEY_PATH, KEY_URL, KEY_BASECOMMIT].contains(&key) {
                            warn!("{}: unknown key '{}' in [{}]", file.display(), key, name);
                        }
                    }
                }
                None if !properties.is_empty() => {
                    warn!("{}: ignoring keys outside any section", file.display());
                }
                None => {}
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            file,
            document,
        })
    }

    /// Path of the backing file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Swap in `document` only once it is safely on disk.
    ///
    /// When `expected` is given, the serialised text is read back first and
    /// must yield that entry unchanged, so nothing unreadable reaches disk.
    fn commit(&mut self, document: Ini, expected: Option<&VendorEntry>) -> Result<()> {
        let write_error = |message: String| Error::ConfigWrite {
            path: self.file.display().to_string(),
            message,
        };

        let buffer = encode(&document).map_err(|e| write_error(e.to_string()))?;
        if let Some(expected) = expected {
            check_round_trip(&buffer, expected).map_err(write_error)?;
        }

        let temp = self
            .file
            .with_file_name(format!(".{}.{}.tmp", defaults::REGISTRY_FILENAME, std::process::id()));
        fs::write(&temp, &buffer).map_err(|e| write_error(e.to_string()))?;
        if let Err(e) = fs::rename(&temp, &self.file) {
            let _ = fs::remove_file(&temp);
            return Err(write_error(e.to_string()));
        }

        debug!("wrote registry {}", self.file.display());
        self.document = document;
        Ok(())
    }
}

impl RegistryStore for IniRegistry {
    fn lookup(&self, path: &VendorPath) -> Option<VendorEntry> {
        self.document
            .section(Some(path.as_str()))
            .and_then(|properties| entry_from_section(path.as_str(), properties).ok())
    }

    fn entries(&self) -> Vec<VendorEntry> {
        self.document
            .iter()
            .filter_map(|(section, properties)| {
                section.and_then(|name| entry_from_section(name, properties).ok())
            })
            .collect()
    }

    fn upsert(&mut self, entry: VendorEntry) -> Result<()> {
        let mut document = self.document.clone();
        document
            .with_section(Some(entry.path.as_str()))
            .set(KEY_PATH, entry.path.as_str())
            .set(KEY_URL, entry.source_location.as_str())
            .set(KEY_BASECOMMIT, entry.pinned_revision.as_str());
        self.commit(document, Some(&entry))
    }

    fn remove(&mut self, path: &VendorPath) -> Result<()> {
        if self.document.section(Some(path.as_str())).is_none() {
            return Err(Error::NotFound {
                path: path.to_string(),
            });
        }
        ensure_directory_absent(&self.root, path)?;

        let mut document = self.document.clone();
        document.delete(Some(path.as_str()));
        self.commit(document, None)
    }

    fn reload(&mut self) -> Result<()> {
        *self = Self::open(&self.root)?;
        Ok(())
    }

    fn file_name(&self) -> Option<&str> {
        Some(defaults::REGISTRY_FILENAME)
    }
}

fn entry_from_section(name: &str, properties: &Properties) -> std::result::Result<VendorEntry, String> {
    let field = |key: &str| {
        properties
            .get(key)
            .ok_or_else(|| format!("section [{}] is missing '{}'", name, key))
    };

    let declared = field(KEY_PATH)?;
    let path = VendorPath::parse(declared).map_err(|e| format!("section [{}]: {}", name, e))?;
    if path.as_str() != name {
        return Err(format!(
            "section [{}] declares path '{}'; the section name must be the path",
            name, declared
        ));
    }
    let url = field(KEY_URL)?;
    let revision =
        Revision::parse(field(KEY_BASECOMMIT)?).map_err(|e| format!("section [{}]: {}", name, e))?;

    Ok(VendorEntry::new(path, url, revision))
}

fn encode(document: &Ini) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    document.write_to(&mut buffer)?;
    Ok(buffer)
}

fn check_round_trip(buffer: &[u8], expected: &VendorEntry) -> std::result::Result<(), String> {
    let text = std::str::from_utf8(buffer).map_err(|e| e.to_string())?;
    let document = Ini::load_from_str(text).map_err(|e| e.to_string())?;
    let name = expected.path.as_str();
    let stored = document
        .section(Some(name))
        .ok_or_else(|| format!("section [{}] does not read back", name))
        .and_then(|properties| entry_from_section(name, properties))?;
    if &stored != expected {
        return Err(format!(
            "entry for {} would read back as url '{}' at {}",
            name, stored.source_location, stored.pinned_revision
        ));
    }
    Ok(())
}

/// Whether `url` is stored in `.subdirs` exactly as given.
///
/// The INI reader trims values and strips surrounding quotes, so some
/// locations cannot be recorded faithfully.
pub fn is_storable_url(url: &str) -> bool {
    let (Ok(path), Ok(revision)) = (VendorPath::parse("x"), Revision::parse("0000")) else {
        return false;
    };
    let entry = VendorEntry::new(path, url, revision);
    let mut document = Ini::new();
    document
        .with_section(Some(entry.path.as_str()))
        .set(KEY_PATH, entry.path.as_str())
        .set(KEY_URL, entry.source_location.as_str())
        .set(KEY_BASECOMMIT, entry.pinned_revision.as_str());
    encode(&document)
        .map(|buffer| check_round_trip(&buffer, &entry).is_ok())
        .unwrap_or(false)
}

/// In-memory registry with the same semantics as [`IniRegistry`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    root: PathBuf,
    entries: Vec<VendorEntry>,
}

impl MemoryRegistry {
    /// Create an empty registry whose directories live under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RegistryStore for MemoryRegistry {
    fn lookup(&self, path: &VendorPath) -> Option<VendorEntry> {
        self.entries.iter().find(|e| &e.path == path).cloned()
    }

    fn entries(&self) -> Vec<VendorEntry> {
        self.entries.clone()
    }

    fn upsert(&mut self, entry: VendorEntry) -> Result<()> {
        match self.entries.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    fn remove(&mut self, path: &VendorPath) -> Result<()> {
        let position = self
            .entries
            .iter()
            .position(|e| &e.path == path)
            .ok_or_else(|| Error::NotFound {
                path: path.to_string(),
            })?;
        ensure_directory_absent(&self.root, path)?;
        self.entries.remove(position);
        Ok(())
    }
}
