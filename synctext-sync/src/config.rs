//! Engine configuration (spec.md §6, "Environment / tunables").
//!
//! Every field has a compile-time default matching spec.md §3/§6; the
//! `synctextd` binary overrides them from CLI flags. There is no file- or
//! environment-backed layer — see SPEC_FULL.md §6.2 for why that would be
//! over-engineering for this daemon's scope.

use std::time::Duration;

/// Poll interval between `stat` checks on the local document (spec.md §4.9).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Number of pending updates that triggers fan-out and merge (spec.md §4.9).
pub const DEFAULT_BATCH_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often the engine checks the local document for changes.
    pub poll_interval: Duration,
    /// Pending-update count that triggers a fan-out/merge pass.
    pub batch_size: usize,
    /// Per-peer send retry budget (spec.md §4.5).
    pub max_retries: u32,
    /// Delay between send retries.
    pub retry_delay: Duration,
    /// Directory containing `<uid>_doc.txt` and `base_doc.txt`.
    pub doc_dir: std::path::PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: synctext_ipc::transport::DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(synctext_ipc::transport::DEFAULT_RETRY_DELAY_MS),
            doc_dir: std::path::PathBuf::from("."),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn doc_path(&self, uid: &synctext_types::Uid) -> std::path::PathBuf {
        self.doc_dir.join(format!("{}_doc.txt", uid.as_str()))
    }

    #[must_use]
    pub fn base_doc_path(&self) -> std::path::PathBuf {
        self.doc_dir.join("base_doc.txt")
    }
}
