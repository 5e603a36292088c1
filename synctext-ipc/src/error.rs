//! Error types for the IPC layer (spec.md §7).

/// Result type for IPC operations.
pub type IpcResult<T> = Result<T, IpcError>;

/// Errors that can occur opening or using shared IPC resources.
///
/// Variants map directly onto spec.md §7's taxonomy: `ShmOpen`/`Mmap`/
/// `QueueCreate` are `StartupFatal`; `Full` is registry exhaustion
/// (also `StartupFatal` at the call site); `Send`/`TooLarge` are the
/// transient/non-retryable outcomes of a `send` attempt.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("failed to open shared registry: {0}")]
    ShmOpen(std::io::Error),

    #[error("failed to size shared registry: {0}")]
    ShmTruncate(std::io::Error),

    #[error("failed to map shared registry: {0}")]
    Mmap(std::io::Error),

    #[error("registry is full (MAX_USERS exceeded)")]
    Full,

    #[error("failed to create own message queue: {0}")]
    QueueCreate(std::io::Error),

    #[error("failed to receive from own message queue: {0}")]
    Receive(std::io::Error),

    #[error("message of {0} bytes exceeds the queue's message size limit of {1}")]
    TooLarge(usize, usize),

    #[error("send to {0} failed after exhausting retries")]
    SendExhausted(String),
}
