//! # git-subdir Library
//!
//! This library vendors third-party git repositories into a host repository
//! as plain directories, and keeps a small registry (`.subdirs`) recording
//! where each directory came from and which revision it matches. It backs
//! the `git-subdir` command-line tool but can be driven directly.
//!
//! ## Quick Example
//!
//! ```
//! use git_subdir::path::VendorPath;
//! use git_subdir::registry::{MemoryRegistry, RegistryStore, VendorEntry};
//! use git_subdir::revision::Revision;
//!
//! let mut registry = MemoryRegistry::new("/work/host");
//! let path = VendorPath::parse("./vendor/lib/").unwrap();
//! assert_eq!(path.as_str(), "vendor/lib");
//!
//! registry
//!     .upsert(VendorEntry::new(
//!         path.clone(),
//!         "https://example.com/lib.git",
//!         Revision::parse("abc123").unwrap(),
//!     ))
//!     .unwrap();
//! assert_eq!(registry.lookup(&path).unwrap().pinned_revision.as_str(), "abc123");
//!
//! // symbolic names are never accepted as pinned revisions
//! assert!(Revision::parse("master").is_err());
//! ```
//!
//! ## Core Concepts
//!
//! - **Registry (`registry`)**: the durable path → (url, basecommit) mapping,
//!   stored as an INI file with one section per vendored path.
//! - **Collaborators (`repository`, `git`, `filesystem`)**: the version
//!   control tool and filesystem primitives, behind traits so they can be
//!   replaced in tests.
//! - **Reconciliation (`reconcile`)**: the `VendorManager`, which checks
//!   preconditions, performs side effects and updates the registry for each
//!   operation, holding a repository lock (`lock`) throughout.
//!
//! ## Operations
//!
//! | Operation    | Effect                                                      |
//! |--------------|-------------------------------------------------------------|
//! | `register`   | clone, pin, flatten and stage a new vendored directory      |
//! | `refresh`    | re-fetch at a new revision, keeping the source location     |
//! | `export`     | overlay vendored files onto a local checkout of the source  |
//! | `deregister` | delete the directory and its registry entry                 |
//! | `restore`    | rebuild a registered directory that went missing            |
//!
//! The library never commits; it leaves the result staged for the user.

pub mod defaults;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod lock;
pub mod output;
pub mod path;
pub mod reconcile;
pub mod registry;
pub mod repository;
pub mod revision;

#[cfg(test)]
mod path_proptest;
