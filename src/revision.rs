//! Pinned revision identifiers

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Shortest abbreviation git itself accepts.
const MIN_LEN: usize = 4;
/// Length of a SHA-256 object name.
const MAX_LEN: usize = 64;

/// A content-addressed revision: lowercase hexadecimal only.
///
/// Branch and tag names are valid *inputs* to checkout but never become a
/// `Revision`; they must be resolved by the version control tool first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn parse(input: &str) -> Result<Self> {
        let valid = (MIN_LEN..=MAX_LEN).contains(&input.len())
            && input
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !valid {
            return Err(Error::InvalidRevision {
                revision: input.to_string(),
            });
        }
        Ok(Self(input.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for messages.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(10)]
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
