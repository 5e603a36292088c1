//! Core type definitions for SyncText.
//!
//! This crate defines the fundamental, IPC-agnostic types shared by every
//! other crate in the workspace:
//! - [`Uid`] — the peer identifier carried on every `Update`
//! - [`WallClock`] — the wall-clock second used for Last-Writer-Wins
//! - [`Update`] and [`UpdateOp`] — the logical edit record
//! - [`codec`] — the `'|'`-delimited, length-prefixed wire serialization
//!
//! Domain-specific logic (diffing, merging, applying) belongs in
//! `synctext-crdt`, not here.

mod codec_impl;
mod uid;
mod update;
mod wall_clock;

pub use uid::Uid;
pub use update::{Update, UpdateOp};
pub use wall_clock::WallClock;

pub mod codec {
    pub use crate::codec_impl::{decode, encode};
}

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur constructing or decoding core types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `uid` was empty or exceeded the 31-byte limit (spec.md §3).
    #[error("invalid uid {0:?}: must be non-empty and at most 31 bytes")]
    InvalidUid(String),

    /// A serialized `Update` could not be parsed back (spec.md §4.1).
    #[error("malformed update: {0}")]
    Malformed(String),
}
