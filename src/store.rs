//! Shared snapshot store.
//!
//! The only state shared between the poller thread and the render loop. One
//! mutex guards the whole tuple, and it is held for the swap or the copy
//! only: fetching happens before [`SnapshotStore::publish`] and drawing
//! after [`SnapshotStore::read`]. Snapshots sit behind [`Arc`], so both
//! critical sections are O(1) regardless of how many routes a stop has.

use crate::types::{CollectionStatus, Snapshot};
use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A snapshot together with the server clock it was taken at.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSnapshot {
    /// The decoded stop snapshot.
    pub snapshot: Snapshot,
    /// Server time as a Unix timestamp; `None` when it could not be parsed.
    pub reference_timestamp: Option<f64>,
}

impl TimedSnapshot {
    /// Bundles a snapshot with its reference timestamp.
    #[must_use]
    pub fn new(snapshot: Snapshot, reference_timestamp: Option<f64>) -> Self {
        Self { snapshot, reference_timestamp }
    }
}

/// Consistent copy of the store, as seen by one frame.
#[derive(Debug, Clone, Default)]
pub struct StoreView {
    /// Latest good snapshot, `None` until the first success.
    pub snapshot: Option<Arc<TimedSnapshot>>,
    /// Outcome of the latest poll.
    pub status: CollectionStatus,
    /// Local time of the latest publish.
    pub last_update: Option<DateTime<Local>>,
    /// Error text of the latest poll, if any.
    pub error: Option<String>,
}

/// Latest snapshot, collection status, update time and error text.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    state: Mutex<StoreView>,
}

impl SnapshotStore {
    /// Creates an empty store in the [`CollectionStatus::Pending`] state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreView> {
        // Writers only ever swap whole fields, so a poisoned guard still holds a valid tuple.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically replaces the state, stamping it with the current local time.
    ///
    /// A `None` snapshot keeps the previous one on screen: a transient
    /// failure never erases the last known good data.
    pub fn publish(
        &self,
        snapshot: Option<TimedSnapshot>,
        status: CollectionStatus,
        error: Option<String>,
    ) {
        self.publish_at(snapshot, status, error, Local::now());
    }

    /// Like [`Self::publish`] with an explicit update time.
    pub fn publish_at(
        &self,
        snapshot: Option<TimedSnapshot>,
        status: CollectionStatus,
        error: Option<String>,
        at: DateTime<Local>,
    ) {
        debug_assert_ne!(status, CollectionStatus::Pending, "pending is only an initial state");

        // Allocate outside the lock.
        let snapshot = snapshot.map(Arc::new);

        let mut state = self.lock();
        if let Some(snapshot) = snapshot {
            state.snapshot = Some(snapshot);
        }
        state.status = status;
        state.error = error;
        state.last_update = Some(at);
    }

    /// Atomically copies the current state.
    #[must_use]
    pub fn read(&self) -> StoreView {
        self.lock().clone()
    }
}
