//! Error types for the replication engine (spec.md §7).

use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("IPC error: {0}")]
    Ipc(#[from] synctext_ipc::IpcError),

    #[error("document I/O error: {0}")]
    Io(#[from] std::io::Error),
}
