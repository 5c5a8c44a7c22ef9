//! Background reaping task

use crate::cache::store::Shared;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, warn};

const REAPER_THREAD_NAME: &str = "reapcache-reaper";

/// Where the reaper ended up running
pub(crate) enum ReaperHandle {
    /// Task on the runtime that constructed the cache
    Task(JoinHandle<()>),

    /// Dedicated thread driving its own runtime
    Thread(std::thread::JoinHandle<()>),

    /// Neither could be started; entries never expire
    Unavailable,
}

/// Start the reaper for `shared`, ticking every `interval`
pub(crate) fn spawn(
    shared: Arc<Shared>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> ReaperHandle {
    if let Ok(handle) = Handle::try_current() {
        return ReaperHandle::Task(handle.spawn(run(shared, interval, shutdown)));
    }

    warn!("No tokio runtime available, running cache reaper on a dedicated thread");

    let spawned = std::thread::Builder::new()
        .name(REAPER_THREAD_NAME.to_string())
        .spawn(move || {
            match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime.block_on(run(shared, interval, shutdown)),
                Err(e) => error!("Failed to build cache reaper runtime: {}", e),
            }
        });

    match spawned {
        Ok(thread) => ReaperHandle::Thread(thread),
        Err(e) => {
            error!("Failed to start cache reaper thread: {}", e);
            ReaperHandle::Unavailable
        }
    }
}

/// Reaping loop: sweep once per interval until signalled or the sender drops.
///
/// The first sweep happens one full interval after start.
pub(crate) async fn run(
    shared: Arc<Shared>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!("Starting cache reaper (interval: {:?})", interval);

    // Both the first and the second deadline must be representable
    let start = Instant::now()
        .checked_add(interval)
        .filter(|start| start.checked_add(interval).is_some());

    let Some(start) = start else {
        debug!("Reap interval out of range, no entry can expire");
        let _ = shutdown.wait_for(|stop| *stop).await;
        debug!("Cache reaper stopped");
        return;
    };

    let mut ticker = time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow_and_update() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                let removed = shared.reap_expired();
                if removed > 0 {
                    debug!("Reaped {} expired entries", removed);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Cache reaper stopped");
}
