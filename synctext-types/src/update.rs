//! The logical edit record exchanged between peers (spec.md §3, §4.1).

use crate::{Uid, WallClock};
use serde::{Deserialize, Serialize};

/// The kind of edit an [`Update`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOp {
    Insert,
    Delete,
    Replace,
}

impl UpdateOp {
    /// The token used for this op in the wire codec (spec.md §4.1).
    #[must_use]
    pub const fn as_token(&self) -> &'static str {
        match self {
            UpdateOp::Insert => "insert",
            UpdateOp::Delete => "delete",
            UpdateOp::Replace => "replace",
        }
    }

    /// Parses the wire token back into an `UpdateOp`.
    #[must_use]
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "insert" => Some(UpdateOp::Insert),
            "delete" => Some(UpdateOp::Delete),
            "replace" => Some(UpdateOp::Replace),
            _ => None,
        }
    }
}

/// A logical edit record.
///
/// `line`, `start_col`, and `end_col` are signed: a value produced locally
/// by the diff step (`synctext-crdt::diff_lines`) is always non-negative,
/// but the codec does not reject an out-of-range value received from a
/// remote peer — the line applier (`synctext-crdt::apply_updates`) is the
/// place a negative `line` is discarded (spec.md §4.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub op: UpdateOp,
    pub line: i64,
    pub start_col: i64,
    pub end_col: i64,
    /// Pre-edit substring over `[start_col, end_col)`. Empty for `Insert`.
    pub prev: String,
    /// Post-edit substring placed at `start_col`. Empty for `Delete`.
    pub next: String,
    pub ts: WallClock,
    pub uid: Uid,
}

impl Update {
    /// Builds an `insert` update: `start_col == end_col`, `prev` empty.
    #[must_use]
    pub fn insert(line: i64, start_col: i64, next: impl Into<String>, ts: WallClock, uid: Uid) -> Self {
        Self {
            op: UpdateOp::Insert,
            line,
            start_col,
            end_col: start_col,
            prev: String::new(),
            next: next.into(),
            ts,
            uid,
        }
    }

    /// Builds a `delete` update: `next` empty.
    #[must_use]
    pub fn delete(
        line: i64,
        start_col: i64,
        end_col: i64,
        prev: impl Into<String>,
        ts: WallClock,
        uid: Uid,
    ) -> Self {
        Self {
            op: UpdateOp::Delete,
            line,
            start_col,
            end_col,
            prev: prev.into(),
            next: String::new(),
            ts,
            uid,
        }
    }

    /// Builds a `replace` update.
    #[must_use]
    pub fn replace(
        line: i64,
        start_col: i64,
        end_col: i64,
        prev: impl Into<String>,
        next: impl Into<String>,
        ts: WallClock,
        uid: Uid,
    ) -> Self {
        Self {
            op: UpdateOp::Replace,
            line,
            start_col,
            end_col,
            prev: prev.into(),
            next: next.into(),
            ts,
            uid,
        }
    }

    /// Half-open column span length, normalized so it is never negative.
    #[must_use]
    pub fn span_len(&self) -> i64 {
        (self.end_col - self.start_col).max(0)
    }
}
