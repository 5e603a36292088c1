//! Rendering snapshot (spec.md §4.10, C10).
//!
//! A plain value type published once per tick through a `watch` channel.
//! The terminal colorizer that consumes it is out of scope (spec.md §1).

use synctext_ipc::LivePeer;

/// Everything a terminal renderer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderSnapshot {
    pub lines: Vec<String>,
    pub peers: Vec<LivePeer>,
    pub notifications: Vec<String>,
}

/// Creates a fresh `(sender, receiver)` pair seeded with an empty snapshot.
#[must_use]
pub fn channel() -> (
    tokio::sync::watch::Sender<RenderSnapshot>,
    tokio::sync::watch::Receiver<RenderSnapshot>,
) {
    tokio::sync::watch::channel(RenderSnapshot::default())
}
