//! SyncText daemon — peer-to-peer collaborative text editing.
//!
//! Usage:
//!   synctextd <uid> [--poll-interval-secs N] [--batch-size N]
//!             [--max-retries N] [--retry-delay-ms N] [--doc-dir PATH] [-v]
//!
//! Registers `uid` in the shared peer registry, creates its own message
//! queue, seeds or loads `<uid>_doc.txt`, and runs the replication engine
//! until interrupted.

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use synctext_ipc::ring::StandardRing;
use synctext_ipc::{OwnQueue, Registry};
use synctext_sync::{Engine, EngineConfig, MqTransport};
use synctext_types::Uid;
use tracing::{error, info, Level};

#[derive(Parser, Debug)]
#[command(name = "synctextd")]
#[command(about = "Peer-to-peer collaborative text-editing daemon")]
struct Args {
    /// This peer's identifier (at most 31 bytes).
    uid: String,

    /// Seconds between local-document poll checks.
    #[arg(long, default_value_t = synctext_sync::config::DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval_secs: u64,

    /// Pending-update count that triggers a fan-out/merge pass.
    #[arg(long, default_value_t = synctext_sync::config::DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Per-peer send retry budget.
    #[arg(long, default_value_t = synctext_ipc::transport::DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Delay between send retries, in milliseconds.
    #[arg(long, default_value_t = synctext_ipc::transport::DEFAULT_RETRY_DELAY_MS)]
    retry_delay_ms: u64,

    /// Directory containing `<uid>_doc.txt` and `base_doc.txt`.
    #[arg(long, default_value = ".")]
    doc_dir: PathBuf,

    /// Enable verbose debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let uid = match Uid::new(args.uid.clone()) {
        Ok(uid) => uid,
        Err(e) => {
            error!("invalid uid: {e}");
            std::process::exit(1);
        }
    };

    let config = EngineConfig {
        poll_interval: Duration::from_secs(args.poll_interval_secs),
        batch_size: args.batch_size,
        max_retries: args.max_retries,
        retry_delay: Duration::from_millis(args.retry_delay_ms),
        doc_dir: args.doc_dir,
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(uid, config))
}

async fn run(uid: Uid, config: EngineConfig) -> anyhow::Result<()> {
    let registry = match Registry::open() {
        Ok(r) => Arc::new(r),
        Err(e) => {
            error!("failed to open shared registry: {e}");
            std::process::exit(1);
        }
    };

    let slot = match registry.register(&uid) {
        Ok(slot) => slot,
        Err(e) => {
            error!("[{uid}] registry full: {e}");
            std::process::exit(1);
        }
    };
    info!("[{uid}] registered slot {}", slot.0);

    let own_queue = match OwnQueue::create(&uid) {
        Ok(q) => q,
        Err(e) => {
            error!("[{uid}] failed to create own queue: {e}");
            registry.release(slot);
            std::process::exit(1);
        }
    };

    let ring: Arc<StandardRing> = Arc::new(StandardRing::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    let transport = Arc::new(MqTransport {
        max_retries: config.max_retries,
        retry_delay: config.retry_delay,
    });
    let (render_tx, _render_rx) = synctext_sync::render::channel();

    let engine = Engine::new(
        uid.clone(),
        config,
        registry.clone() as Arc<dyn synctext_sync::PeerSource>,
        transport as Arc<dyn synctext_sync::Transport>,
        Arc::clone(&ring),
        render_tx,
    )
    .await?;

    let listener_handle = engine.spawn_listener(own_queue, Arc::clone(&shutdown));

    spawn_signal_watcher(Arc::clone(&shutdown));

    let result = engine.run(Arc::clone(&shutdown)).await;

    shutdown.store(true, Ordering::SeqCst);
    let _ = listener_handle.await;
    registry.release(slot);

    if let Err(e) = result {
        error!("[{uid}] engine error: {e}");
        std::process::exit(1);
    }

    info!("[{uid}] shut down cleanly");
    Ok(())
}

fn spawn_signal_watcher(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                    .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        shutdown.store(true, Ordering::SeqCst);
    });
}
