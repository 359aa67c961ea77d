//! Background re-fetching of a single machine.
//!
//! Spawns a thread that owns a client clone, fetches the machine at a fixed
//! interval and hands the newest result over a bounded channel. Stale
//! snapshots are dropped, never queued.
//!
//! Each `Poller` spawns exactly one thread, shut down and joined on drop.
use crossbeam_channel as xch;
use machines_traits::clock::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::model::Machine;

pub type Snapshot = Result<Machine, ApiError>;

/// Upper bound on one uninterrupted sleep, so drop stays prompt.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

pub struct Poller {
    rx: xch::Receiver<Snapshot>,
    polls: Arc<AtomicU64>,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Poller {
    pub fn spawn<C: Clock + Send + Sync + 'static>(
        client: ApiClient,
        token: String,
        machine_id: String,
        interval: Duration,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::bounded::<Snapshot>(1);
        let drain = rx.clone();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let polls = Arc::new(AtomicU64::new(0));
        let polls_clone = polls.clone();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("Poller thread received shutdown signal");
                    break;
                }

                // The interval runs from the start of each fetch.
                let next_at = clock.now() + interval;
                let snapshot = client.machine(&token, &machine_id);
                polls_clone.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = &snapshot {
                    tracing::debug!(machine = %machine_id, detail = %e.detail(), "poll failed");
                }

                // Latest wins: replace an unread snapshot instead of blocking.
                let mut pending = snapshot;
                loop {
                    match tx.try_send(pending) {
                        Ok(()) => break,
                        Err(xch::TrySendError::Full(v)) => {
                            let _ = drain.try_recv();
                            pending = v;
                        }
                        Err(xch::TrySendError::Disconnected(_)) => {
                            tracing::debug!("Poller consumer disconnected, exiting thread");
                            return;
                        }
                    }
                }

                loop {
                    let left = clock.until(next_at);
                    if left.is_zero() || shutdown_clone.load(Ordering::Relaxed) {
                        break;
                    }
                    clock.sleep(left.min(SLEEP_SLICE));
                }
            }
            tracing::trace!("Poller thread exiting cleanly");
        });

        Self {
            rx,
            polls,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Newest snapshot not yet taken, if any.
    pub fn latest(&self) -> Option<Snapshot> {
        self.rx.try_iter().last()
    }

    /// Waits up to `timeout` for the next snapshot.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Snapshot> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Number of fetches attempted so far.
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // An in-flight fetch finishes first; it is bounded by the client timeout.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Poller thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "Poller thread panicked during shutdown");
                }
            }
        }
    }
}
