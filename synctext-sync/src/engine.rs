//! Replication engine main loop (spec.md §4.9, C9).
//!
//! An async orchestrator driven by `tokio::time::interval`, the same
//! "async orchestrator + blocking-task workers" shape as the teacher's
//! `SyncEngine`/`SyncOrchestrator` pair — except this engine owns its tick
//! logic directly rather than dispatching through a message protocol,
//! since there is exactly one tick shape to run (spec.md §4.9 steps 1-4).

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::listener::NotificationSink;
use crate::render::RenderSnapshot;
use crate::{doc, listener};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use synctext_ipc::{LivePeer, OwnQueue, RecvRing, Registry};
use synctext_types::{Uid, Update};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Supplies the set of currently-live peers to fan out to.
pub trait PeerSource: Send + Sync {
    fn snapshot(&self) -> Vec<LivePeer>;
}

impl PeerSource for Registry {
    fn snapshot(&self) -> Vec<LivePeer> {
        Registry::snapshot(self)
    }
}

/// Delivers an encoded update to a single peer's queue.
///
/// Abstracted so tests can substitute an in-memory transport instead of
/// real POSIX message queues, the same substitution the teacher makes with
/// a mock `SyncTransport` in its own sync engine tests.
pub trait Transport: Send + Sync {
    fn send(&self, queue_name: &str, message: &str) -> EngineResult<()>;
}

/// The production transport, built on [`synctext_ipc::transport::send_with_retry`].
pub struct MqTransport {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Transport for MqTransport {
    fn send(&self, queue_name: &str, message: &str) -> EngineResult<()> {
        synctext_ipc::transport::send_with_retry(
            queue_name,
            message,
            self.max_retries,
            self.retry_delay,
        )
        .map_err(Into::into)
    }
}

/// Owns every piece of per-process state for one peer's replication loop
/// (Design Notes §9: "process-wide engine state is bundled into an `Engine`
/// value").
pub struct Engine<const N: usize> {
    uid: Uid,
    config: EngineConfig,
    doc_path: PathBuf,
    peers: Arc<dyn PeerSource>,
    transport: Arc<dyn Transport>,
    ring: Arc<RecvRing<N>>,
    render_tx: watch::Sender<RenderSnapshot>,
    notifications: NotificationSink,

    doc_lines: Vec<String>,
    observed_lines: Vec<String>,
    last_mtime: Option<SystemTime>,
    local_unmerged: Vec<Update>,
    recv_unmerged: Vec<Update>,
    outgoing: Vec<Update>,
    prev_edits: Vec<Update>,
}

impl<const N: usize> Engine<N> {
    pub async fn new(
        uid: Uid,
        config: EngineConfig,
        peers: Arc<dyn PeerSource>,
        transport: Arc<dyn Transport>,
        ring: Arc<RecvRing<N>>,
        render_tx: watch::Sender<RenderSnapshot>,
    ) -> EngineResult<Self> {
        let doc_path = config.doc_path(&uid);
        doc::seed_if_missing(&doc_path, &config.base_doc_path()).await?;

        let lines = doc::read_lines(&doc_path).await?;
        let last_mtime = doc::mtime(&doc_path).await;

        Ok(Self {
            uid,
            config,
            doc_path,
            peers,
            transport,
            ring,
            render_tx,
            notifications: listener::notification_sink(),
            doc_lines: lines.clone(),
            observed_lines: lines,
            last_mtime,
            local_unmerged: Vec::new(),
            recv_unmerged: Vec::new(),
            outgoing: Vec::with_capacity(32),
            prev_edits: Vec::new(),
        })
    }

    /// Spawns the listener task (C7) on a blocking thread, wired to this
    /// engine's ring, and returns its `JoinHandle`.
    pub fn spawn_listener(
        &self,
        queue: OwnQueue,
        shutdown: Arc<AtomicBool>,
    ) -> tokio::task::JoinHandle<()> {
        let ring = Arc::clone(&self.ring);
        let notifications = Arc::clone(&self.notifications);
        tokio::task::spawn_blocking(move || listener::run(queue, ring, notifications, shutdown))
    }

    /// Runs the tick loop until `shutdown` is observed set.
    pub async fn run(mut self, shutdown: Arc<AtomicBool>) -> EngineResult<()> {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        loop {
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            interval.tick().await;
            if shutdown.load(Ordering::SeqCst) {
                break;
            }
            self.tick().await?;
        }
        Ok(())
    }

    /// One pass of spec.md §4.9's four tick steps: local-change detection,
    /// fan-out, ring drain, and merge.
    pub async fn tick(&mut self) -> EngineResult<()> {
        self.detect_local_changes().await?;
        self.fan_out().await;
        self.drain_ring();
        self.merge_pending().await?;
        Ok(())
    }

    async fn detect_local_changes(&mut self) -> EngineResult<()> {
        let current_mtime = doc::mtime(&self.doc_path).await;
        if current_mtime == self.last_mtime {
            return Ok(());
        }

        let new_lines = doc::read_lines(&self.doc_path).await?;
        let updates = synctext_crdt::diff_lines(&self.observed_lines, &new_lines, &self.uid);
        self.observed_lines = new_lines;
        self.last_mtime = current_mtime;

        if !updates.is_empty() {
            debug!("detected {} local update(s)", updates.len());
            self.local_unmerged.extend(updates.iter().cloned());
            self.outgoing.extend(updates.iter().cloned());
            self.prev_edits = updates;
        } else {
            self.prev_edits.clear();
        }

        self.publish_snapshot(Vec::new());
        Ok(())
    }

    /// Encodes and fans out every batched update to every other live peer.
    /// The actual sends (each a retrying, possibly-sleeping syscall loop)
    /// run on a blocking task so a slow or dead peer's queue can't stall the
    /// tick interval, the same `spawn_blocking` treatment the listener gets.
    async fn fan_out(&mut self) {
        if self.outgoing.len() < self.config.batch_size {
            return;
        }
        let peers = self.peers.snapshot();
        let self_uid = self.uid.as_str().to_string();
        let mut jobs = Vec::with_capacity(self.outgoing.len() * peers.len());
        for update in self.outgoing.drain(..) {
            let encoded = synctext_types::codec::encode(&update);
            for peer in &peers {
                if peer.uid == self_uid {
                    continue;
                }
                let queue_name = if peer.queue_name.is_empty() {
                    format!("/mq_{}", peer.uid)
                } else {
                    peer.queue_name.clone()
                };
                jobs.push((peer.uid.clone(), queue_name, encoded.clone()));
            }
        }
        if jobs.is_empty() {
            return;
        }

        let transport = Arc::clone(&self.transport);
        let outcome = tokio::task::spawn_blocking(move || {
            for (peer_uid, queue_name, encoded) in jobs {
                if let Err(e) = transport.send(&queue_name, &encoded) {
                    warn!("send to {peer_uid} failed: {e}");
                }
            }
        })
        .await;
        if let Err(e) = outcome {
            warn!("fan-out task panicked: {e}");
        }
    }

    fn drain_ring(&mut self) {
        for raw in self.ring.drain() {
            match synctext_types::codec::decode(&raw) {
                Ok(update) => self.recv_unmerged.push(update),
                Err(e) => warn!("failed to decode incoming update: {e}"),
            }
        }
    }

    async fn merge_pending(&mut self) -> EngineResult<()> {
        let total_pending = self.local_unmerged.len() + self.recv_unmerged.len();
        if total_pending == 0 || total_pending < self.config.batch_size {
            return Ok(());
        }

        let mut all = Vec::with_capacity(total_pending);
        all.extend(self.local_unmerged.drain(..));
        all.extend(self.recv_unmerged.drain(..));

        let winners = synctext_crdt::merge(&all);
        if winners.is_empty() {
            self.prev_edits.clear();
            warn!("no winning updates after merge");
            return Ok(());
        }

        synctext_crdt::apply_updates(&mut self.doc_lines, &winners);
        doc::write_lines(&self.doc_path, &self.doc_lines).await?;
        self.observed_lines = self.doc_lines.clone();
        self.last_mtime = doc::mtime(&self.doc_path).await;
        self.prev_edits.clear();

        let conflict_detected = all.len() > winners.len();
        let message = if conflict_detected {
            "Conflict detected and resolved using LWW"
        } else {
            "All updates merged successfully"
        };
        info!("{message}");
        self.publish_snapshot(vec![message.to_string()]);
        Ok(())
    }

    fn publish_snapshot(&self, mut notifications: Vec<String>) {
        notifications.extend(std::mem::take(&mut *self.notifications.lock().unwrap()));
        let snapshot = RenderSnapshot {
            lines: self.doc_lines.clone(),
            peers: self.peers.snapshot(),
            notifications,
        };
        let _ = self.render_tx.send(snapshot);
    }

    /// Current in-memory document contents, as last written or merged.
    #[must_use]
    pub fn doc_lines(&self) -> &[String] {
        &self.doc_lines
    }
}
