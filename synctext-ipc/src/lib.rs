//! Process-wide peer discovery and point-to-point delivery for SyncText
//! (spec.md §4.4, §4.5, §4.6).
//!
//! Three pieces, each a thin, purpose-built wrapper around a POSIX
//! primitive rather than a generic abstraction — the teacher's
//! `privstack-sync::transport::SyncTransport` trait is the right shape when
//! a system supports several transports (P2P, cloud); this system has
//! exactly one, so there is no trait to extract:
//!
//! - [`registry`] — the shared-memory peer directory with lock-free slot
//!   claim/release (C4).
//! - [`ring`] — the fixed-capacity SPSC receive ring between the listener
//!   and the engine (C6).
//! - [`transport`] — per-peer POSIX message queues with retrying fan-out
//!   (C5).

pub mod registry;
pub mod ring;
pub mod transport;

mod error;

pub use error::{IpcError, IpcResult};
pub use registry::{LivePeer, Registry, SlotId};
pub use ring::RecvRing;
pub use transport::OwnQueue;
