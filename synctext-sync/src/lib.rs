//! Replication engine, listener task, and rendering snapshot for SyncText
//! (spec.md §4.7, §4.9, §4.10).
//!
//! The engine is an async orchestrator owning one tick loop; there is no
//! generic `SyncTransport`/`SyncEngine` split like the teacher's
//! multi-transport sync layer needs, because this system has exactly one
//! wire path (POSIX message queues) and exactly one tick shape to drive.

pub mod config;
pub mod doc;
pub mod engine;
pub mod error;
pub mod listener;
pub mod render;

pub use config::EngineConfig;
pub use engine::{Engine, MqTransport, PeerSource, Transport};
pub use error::{EngineError, EngineResult};
pub use render::RenderSnapshot;
