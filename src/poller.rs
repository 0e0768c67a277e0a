//! Background polling.
//!
//! The poller cycles `Fetching → Publishing → Sleeping` until its
//! [`CancellationToken`] is cancelled. Sleeping is split into short ticks
//! (one second by default) and the token is checked before each tick, so
//! shutdown never waits for a full poll interval. There is no backoff: a
//! failed fetch waits the same interval as a successful one.

use crate::source::BoxedSource;
use crate::store::{SnapshotStore, TimedSnapshot};
use crate::timestamp::parse_server_time;
use crate::types::CollectionStatus;
use crate::{debug, info, time_scope, trace, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Cooperative shutdown flag shared by the poller, the render loop and
/// signal handling.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`Self::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The underlying flag, for registration with signal handlers.
    #[must_use]
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

/// Timing of the poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Pause between the end of one cycle and the next fetch.
    pub interval: Duration,
    /// Upper bound for one fetch.
    pub timeout: Duration,
    /// Sleep granularity; bounds cancellation latency.
    pub tick: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            timeout: Duration::from_secs(60),
            tick: Duration::from_secs(1),
        }
    }
}

/// Periodically fetches a snapshot and publishes it to the store.
pub struct Poller {
    source: BoxedSource,
    store: Arc<SnapshotStore>,
    config: PollerConfig,
    token: CancellationToken,
}

impl Poller {
    /// Creates a poller. Nothing runs until [`Self::run`] or [`Self::spawn`].
    #[must_use]
    pub fn new(
        source: BoxedSource,
        store: Arc<SnapshotStore>,
        config: PollerConfig,
        token: CancellationToken,
    ) -> Self {
        Self { source, store, config, token }
    }

    /// Performs one fetch and publishes the outcome.
    ///
    /// On success the server time is parsed into the reference timestamp.
    /// If that fails the status becomes `Failed` but the new routes are
    /// still shown, without arrival claims. On fetch failure the previous
    /// snapshot stays in place and the status becomes `Failed`.
    pub fn poll_once(&mut self) -> CollectionStatus {
        let fetched = {
            time_scope!("poller", format!("fetch from {}", self.source.id()));
            self.source.fetch(self.config.timeout)
        };

        match fetched {
            Ok(snapshot) => {
                let (reference, status, error) = match parse_server_time(&snapshot.current_time) {
                    Ok(ts) => (Some(ts), CollectionStatus::Ok, None),
                    Err(e) => {
                        warn!("poller", "no reference timestamp: {e}");
                        (None, CollectionStatus::Failed, Some(e.to_string()))
                    }
                };
                debug!(
                    "poller",
                    "publishing {} routes, reference={reference:?}",
                    snapshot.routes.len()
                );
                self.store.publish(Some(TimedSnapshot::new(snapshot, reference)), status, error);
                status
            }
            Err(e) => {
                warn!("poller", "fetch failed: {e}");
                self.store.publish(None, CollectionStatus::Failed, Some(e.to_string()));
                CollectionStatus::Failed
            }
        }
    }

    /// Sleeps for the poll interval in ticks; returns false if cancelled meanwhile.
    fn sleep_interval(&self) -> bool {
        let tick = self.config.tick.max(Duration::from_millis(1));
        let mut slept = Duration::ZERO;
        while slept < self.config.interval {
            if self.token.is_cancelled() {
                return false;
            }
            let step = tick.min(self.config.interval - slept);
            thread::sleep(step);
            slept += step;
        }
        !self.token.is_cancelled()
    }

    /// Runs the poll cycle on the current thread until cancelled.
    pub fn run(mut self) {
        info!("poller", "started, interval={:?} timeout={:?}", self.config.interval, self.config.timeout);
        while !self.token.is_cancelled() {
            let status = self.poll_once();
            trace!("poller", "cycle finished with {status:?}");
            if !self.sleep_interval() {
                break;
            }
        }
        info!("poller", "terminated");
    }

    /// Runs the poll cycle on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<PollerHandle> {
        let thread = thread::Builder::new()
            .name("stopboard-poller".to_string())
            .spawn(move || self.run())?;
        Ok(PollerHandle { thread })
    }
}

/// Handle to a spawned poller thread.
#[derive(Debug)]
pub struct PollerHandle {
    thread: JoinHandle<()>,
}

impl PollerHandle {
    /// Blocks until the poller notices cancellation and exits.
    pub fn join(self) {
        if self.thread.join().is_err() {
            warn!("poller", "poller thread panicked");
        }
    }

    /// Returns true if the poller thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}
