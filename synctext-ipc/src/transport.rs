//! Per-peer POSIX message queue transport (spec.md §4.5, C5).

use crate::{IpcError, IpcResult};
use posixmq::{OpenOptions, PosixMq};
use std::time::Duration;
use synctext_types::Uid;

/// Fallback message size limit when `/proc/sys/fs/mqueue/msgsize_max`
/// cannot be read (spec.md §4.5).
const FALLBACK_MSG_SIZE: usize = 8192;

/// Queue depth for each peer's own inbox.
const QUEUE_CAPACITY: usize = 10;

/// Default send-retry budget (spec.md §4.5, §6).
pub const DEFAULT_MAX_RETRIES: u32 = 6;

/// Default delay between send retries (spec.md §4.5, §6).
pub const DEFAULT_RETRY_DELAY_MS: u64 = 100;

/// Reads the system-wide POSIX message queue size cap, mirroring the
/// reference `maxSysMsgSize()` (`/proc/sys/fs/mqueue/msgsize_max`).
/// Returns `None` (rather than the reference's silent `0`) so callers can
/// apply their own fallback.
#[must_use]
pub fn system_max_msg_size() -> Option<usize> {
    std::fs::read_to_string("/proc/sys/fs/mqueue/msgsize_max")
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
}

/// A peer's own inbound message queue, created and owned by that peer's
/// process (spec.md §4.5, "Own queue creation").
pub struct OwnQueue {
    mq: PosixMq,
    max_msg_len: usize,
}

impl OwnQueue {
    /// Creates (or opens, if it already exists from a prior crash) this
    /// process's own queue, named `/mq_<uid>`.
    pub fn create(uid: &Uid) -> IpcResult<Self> {
        // spec.md §4.5: the queue's message size is min(8192, system max),
        // never raised above the fixed ceiling even on hosts configured
        // with a larger `msgsize_max`.
        let max_msg_len = system_max_msg_size()
            .map(|sys_max| sys_max.min(FALLBACK_MSG_SIZE))
            .unwrap_or(FALLBACK_MSG_SIZE);
        let mq = OpenOptions::readonly()
            .create()
            .mode(0o666)
            .capacity(QUEUE_CAPACITY)
            .max_msg_len(max_msg_len)
            .open(uid.queue_name())
            .map_err(IpcError::QueueCreate)?;
        Ok(Self { mq, max_msg_len })
    }

    /// Blocks until a message arrives, returning its bytes as `String`.
    /// Any byte sequence that is not valid UTF-8 is treated the same as a
    /// malformed wire message downstream (spec.md §4.9 drains by passing
    /// through the decoder, which rejects it).
    pub fn receive(&self) -> IpcResult<String> {
        let mut buf = vec![0u8; self.max_msg_len + 1];
        let (len, _priority) = self.mq.recv(&mut buf).map_err(IpcError::Receive)?;
        buf.truncate(len);
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    #[must_use]
    pub fn max_msg_len(&self) -> usize {
        self.max_msg_len
    }
}

/// Sends `message` to the peer's queue `queue_name`, retrying transient
/// open/send failures up to `max_retries` times with `retry_delay` between
/// attempts (spec.md §4.5, "Fan-out send"). A message exceeding the
/// target's size limit is never retried.
pub fn send_with_retry(
    queue_name: &str,
    message: &str,
    max_retries: u32,
    retry_delay: Duration,
) -> IpcResult<()> {
    for attempt in 0..max_retries.max(1) {
        let mq = match OpenOptions::writeonly().open(queue_name) {
            Ok(mq) => mq,
            Err(e) => {
                tracing::debug!("attempt {attempt} opening {queue_name} failed: {e}");
                std::thread::sleep(retry_delay);
                continue;
            }
        };

        let limit = mq.attributes().map(|a| a.max_msg_len).unwrap_or(FALLBACK_MSG_SIZE);
        if message.len() > limit {
            return Err(IpcError::TooLarge(message.len(), limit));
        }

        if mq.send(0, message.as_bytes()).is_ok() {
            tracing::debug!("sent {} bytes to {queue_name}", message.len());
            return Ok(());
        }
        std::thread::sleep(retry_delay);
    }

    tracing::warn!("exhausted retries sending to {queue_name}");
    Err(IpcError::SendExhausted(queue_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sending_to_nonexistent_queue_exhausts_retries_quickly() {
        let result = send_with_retry(
            "/synctext_test_nonexistent_queue",
            "hello",
            2,
            Duration::from_millis(1),
        );
        assert!(matches!(result, Err(IpcError::SendExhausted(_))));
    }

    #[test]
    fn create_then_send_then_receive_round_trips() {
        let uid = Uid::new(format!("txtest{}", std::process::id())).unwrap();
        let queue = OwnQueue::create(&uid).unwrap();
        send_with_retry(&uid.queue_name(), "payload", 3, Duration::from_millis(10)).unwrap();
        let received = queue.receive().unwrap();
        assert_eq!(received, "payload");
        let _ = posixmq::remove_queue(uid.queue_name());
    }
}
