//! CRDT logic for SyncText: the line diff, the line applier, and the
//! Last-Writer-Wins merge (spec.md §4.2, §4.3, §4.8).
//!
//! Unlike `privstack-crdt`'s generic, type-parameterized CRDTs
//! (`LWWRegister<T>`, `ORSet<T>`, `RGA<T>`), this document's data model is
//! fixed — it is always lines of text and `Update` records — so these are
//! free functions over borrowed slices rather than a family of generic
//! types. All three satisfy the convergence properties the teacher
//! documents for its CRDTs: merge is commutative, associative, and
//! idempotent over the `keep` bitmap it computes.

mod applier;
mod diff;
mod merge;

pub use applier::apply_updates;
pub use diff::diff_lines;
pub use merge::{collides, merge, winner};
