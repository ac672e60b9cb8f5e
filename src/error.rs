//! # Error Handling
//!
//! This module defines the centralized error type for `git-subdir`. Every
//! failure an operation can report is one variant of [`Error`], built with
//! `thiserror` so each carries a readable message and the context needed to
//! act on it.
//!
//! The variants fall into a small closed set of kinds:
//!
//! - **Precondition failures** (`PreconditionViolation`, `InvalidPath`,
//!   `InvalidRevision`, `NotFound`, `Locked`): detected before any side
//!   effect. The repository is exactly as it was.
//! - **External tool failures** (`ExternalToolFailure`, `RevisionMismatch`):
//!   `git` or a filesystem primitive failed while acting. The working tree
//!   may have been partially modified and should be inspected.
//! - **Registry failures** (`ConfigRead`, `ConfigWrite`, `InvariantViolation`):
//!   the `.subdirs` file could not be read, written, or updated consistently.
//!
//! Absence of a registry entry is not an error in itself: lookups return
//! `Option`. `NotFound` is only raised when an operation requires an entry.

use thiserror::Error;

/// Main error type for git-subdir operations
#[derive(Error, Debug)]
pub enum Error {
    /// A check that must hold before acting did not hold.
    ///
    /// Raised for dirty working trees, paths that already exist (or do not),
    /// registry/filesystem disagreement, and source location mismatches.
    #[error("{path}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    PreconditionViolation {
        path: String,
        message: String,
        /// Optional hint for how to get out of the situation
        hint: Option<String>,
    },

    /// An external command or filesystem primitive failed while acting.
    #[error("{command} failed: {message}")]
    ExternalToolFailure { command: String, message: String },

    /// The pinned revision could not be checked out at an export destination.
    #[error("revision {revision} is not reachable in {destination}")]
    RevisionMismatch {
        revision: String,
        destination: String,
    },

    /// The registry file exists but could not be read or is malformed.
    #[error("cannot read registry {path}: {message}")]
    ConfigRead { path: String, message: String },

    /// The registry file could not be written.
    #[error("cannot write registry {path}: {message}")]
    ConfigWrite { path: String, message: String },

    /// An operation required a registry entry that does not exist.
    #[error("{path} is not a vendored directory")]
    NotFound { path: String },

    /// The registry would become inconsistent with the filesystem.
    #[error("registry invariant violated for {path}: {message}")]
    InvariantViolation { path: String, message: String },

    /// A string could not be accepted as a pinned revision.
    #[error("invalid revision '{revision}': expected 4 to 64 lowercase hexadecimal characters")]
    InvalidRevision { revision: String },

    /// A vendored path argument could not be normalised.
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// Another mutating operation holds the repository lock.
    #[error("another git-subdir operation is running (lock held on {lock})")]
    Locked { lock: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a precondition failure without a hint.
    pub fn precondition(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::PreconditionViolation {
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Returns `true` when the failure was detected before any side effect.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::PreconditionViolation { .. }
                | Error::NotFound { .. }
                | Error::InvalidRevision { .. }
                | Error::InvalidPath { .. }
                | Error::Locked { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
