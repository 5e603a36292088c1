//! Peer identifier.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a `uid`, in bytes (spec.md §3).
pub const MAX_UID_LEN: usize = 31;

/// The identifier a peer registers and signs its `Update`s with.
///
/// Non-empty, at most [`MAX_UID_LEN`] bytes. Unlike `privstack`'s UUID-based
/// `PeerId`, `Uid` is operator-chosen (it is the daemon's sole CLI argument)
/// and carried verbatim through the wire codec, so it is a validated string
/// rather than a UUID wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Validates and wraps a uid string.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.is_empty() || s.len() > MAX_UID_LEN {
            return Err(Error::InvalidUid(s));
        }
        Ok(Self(s))
    }

    /// Returns the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the per-peer inbound queue name for this uid (spec.md §6).
    #[must_use]
    pub fn queue_name(&self) -> String {
        format!("/mq_{}", self.0)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Uid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
