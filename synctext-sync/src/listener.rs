//! Blocking message-queue listener (spec.md §4.7, C7).
//!
//! Runs the blocking `mq_receive` equivalent on a `spawn_blocking` thread
//! so the async runtime's worker threads stay free, the same pattern the
//! teacher uses for blocking storage calls via `tokio::task::spawn_blocking`.
//! Each received message is pushed onto the [`RecvRing`]; a full ring drops
//! the message with a `warn!`, matching the reference listener's behavior.
//! A successfully-pushed message is also decoded far enough to append a
//! "Received update from <uid>: Line <n> modified" note to the shared
//! [`NotificationSink`], mirroring `listenerThreadFunc`'s
//! `g_recent_notifications` side effect. A receive error that isn't a
//! transient interrupt is followed by a short sleep before retrying, rather
//! than busy-looping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use synctext_ipc::{OwnQueue, RecvRing};
use tracing::{info, warn};

/// Buffer the listener appends human-readable notifications to; drained by
/// the engine once per tick and folded into the next [`crate::RenderSnapshot`]
/// (spec.md §4.10).
pub type NotificationSink = Arc<Mutex<Vec<String>>>;

/// Builds an empty, shareable notification sink.
#[must_use]
pub fn notification_sink() -> NotificationSink {
    Arc::new(Mutex::new(Vec::new()))
}

/// Delay before retrying after a non-fatal receive error (spec.md §4.7).
const RECEIVE_ERROR_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Runs until `shutdown` is observed set. Intended to be spawned with
/// `tokio::task::spawn_blocking`.
pub fn run<const N: usize>(
    queue: OwnQueue,
    ring: Arc<RecvRing<N>>,
    notifications: NotificationSink,
    shutdown: Arc<AtomicBool>,
) {
    info!("listener running");
    while !shutdown.load(Ordering::SeqCst) {
        match queue.receive() {
            Ok(message) => {
                if !ring.push(message.clone()) {
                    warn!("recv ring full, dropping message");
                } else {
                    match synctext_types::codec::decode(&message) {
                        Ok(update) => {
                            let note = format!(
                                "Received update from {}: Line {} modified",
                                update.uid, update.line
                            );
                            notifications.lock().unwrap().push(note);
                        }
                        Err(_) => warn!("received (badly formed) message"),
                    }
                }
            }
            Err(e) => {
                warn!("listener receive error: {e}");
                std::thread::sleep(RECEIVE_ERROR_RETRY_DELAY);
            }
        }
    }
    info!("listener exiting");
}
