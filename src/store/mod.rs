//! # Async Stores - One Lifecycle, Many Domains
//!
//! Every Prism store follows the same status lifecycle:
//!
//! ```text
//! Idle ──load──▶ Loading ──commit──▶ Ready
//!                   │
//!                   └────fail──────▶ Error
//! ```
//!
//! and every domain store (packages, tasks, registry, prompts, choice,
//! upload) embeds the same [`StoreCore`]: four reactive cells, one epoch
//! guard, one snapshot projection.
//!
//! ## 🎯 Core Concepts
//!
//! ### Last-Initiated-Wins
//!
//! Calling `load` while a previous load is in flight is allowed and simply
//! re-bumps the epoch. Whichever call was *initiated* last owns the store;
//! results from superseded calls are discarded at commit time regardless of
//! the order they resolve in. There is no queuing and no debouncing.
//!
//! ### Snapshots
//!
//! [`StoreCore::snapshot`] is a memoized [`Computed`] projection over the
//! store's cells, so a consumer always reads one consistent combined view -
//! never `Ready` with a stale error still set.
//!
//! ### Reset, Not Destroy
//!
//! Stores are created once and live for the process lifetime. `reset()`
//! restores defaults and bumps the epoch, which cancels any in-flight
//! write. `load` with an empty key short-circuits to `reset()`.
//!
//! ## 📚 Domain Stores
//!
//! - [`PackageStore`](package::PackageStore): registry lookup by name
//! - [`TaskStore`](tasks::TaskStore): task list with auto-refresh
//! - [`RegistryStore`](registry::RegistryStore): category/tag/concept registry
//! - [`PromptFragmentStore`](prompts::PromptFragmentStore): prompt fragments by section
//! - [`SegmentedChoiceStore`](choice::SegmentedChoiceStore): locally-computed options
//! - [`UploadLinkStore`](upload::UploadLinkStore): upload link acquisition

pub mod choice;
pub mod package;
pub mod prompts;
pub mod registry;
pub mod tasks;
pub mod upload;

use chrono::{DateTime, Utc};

use crate::epoch::{Epoch, EpochGuard};
use crate::reactive::{Cell, Computed};

/// Store status: exactly one at all times
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing requested yet, or reset
    Idle,
    /// A load is in flight
    Loading,
    /// Data committed; `Snapshot::data` is set
    Ready,
    /// Load failed; `Snapshot::error` is set, data cleared
    Error,
}

/// One consistent combined read of a store's state
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Current lifecycle status
    pub status: Status,
    /// Committed data; `Some` whenever status is `Ready`
    pub data: Option<T>,
    /// Failure message; `Some` exactly when status is `Error`
    pub error: Option<String>,
    /// Commit timestamp of the data currently visible
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Snapshot<T> {
    /// Whether committed data is visible
    pub fn is_ready(&self) -> bool {
        self.status == Status::Ready
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.status == Status::Loading
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            status: Status::Idle,
            data: None,
            error: None,
            last_updated: None,
        }
    }
}

/// Shared state machine embedded by every domain store
///
/// Composes the status, data, error and timestamp cells with an
/// [`EpochGuard`] and exposes the guarded transitions. Domain stores call
/// `begin_load()` before their fetch and hand the returned [`Epoch`] to
/// `commit`/`fail`; a stale epoch makes both into silent no-ops.
///
/// Cloning shares all cells and the guard.
#[derive(Clone)]
pub struct StoreCore<T> {
    status: Cell<Status>,
    data: Cell<Option<T>>,
    error: Cell<Option<String>>,
    last_updated: Cell<Option<DateTime<Utc>>>,
    epoch: EpochGuard,
    snapshot: Computed<Snapshot<T>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> StoreCore<T> {
    /// Create a core in the `Idle` state
    pub fn new() -> Self {
        let status = Cell::new(Status::Idle);
        let data: Cell<Option<T>> = Cell::new(None);
        let error: Cell<Option<String>> = Cell::new(None);
        let last_updated: Cell<Option<DateTime<Utc>>> = Cell::new(None);

        let snapshot = {
            let (status, data, error, last_updated) = (
                status.clone(),
                data.clone(),
                error.clone(),
                last_updated.clone(),
            );
            Computed::new(move || Snapshot {
                status: status.get(),
                data: data.get(),
                error: error.get(),
                last_updated: last_updated.get(),
            })
        };
        snapshot.track(&status);
        snapshot.track(&data);
        snapshot.track(&error);
        snapshot.track(&last_updated);

        Self {
            status,
            data,
            error,
            last_updated,
            epoch: EpochGuard::new(),
            snapshot,
        }
    }

    /// Start a load: new epoch, `Loading`, error cleared
    ///
    /// Previously committed data stays visible while the load is in
    /// flight.
    pub fn begin_load(&self) -> Epoch {
        let epoch = self.epoch.begin();
        self.error.set(None);
        self.status.set(Status::Loading);
        epoch
    }

    /// Commit `data` if `epoch` is still current
    ///
    /// Returns whether the commit was applied. A superseded epoch mutates
    /// nothing.
    pub fn commit(&self, epoch: Epoch, data: T) -> bool {
        if !self.epoch.is_current(epoch) {
            return false;
        }
        self.data.set(Some(data));
        self.error.set(None);
        self.last_updated.set(Some(Utc::now()));
        self.status.set(Status::Ready);
        true
    }

    /// Record a failure if `epoch` is still current
    ///
    /// Clears data and returns whether the failure was applied.
    pub fn fail(&self, epoch: Epoch, message: impl Into<String>) -> bool {
        if !self.epoch.is_current(epoch) {
            return false;
        }
        self.data.set(None);
        self.error.set(Some(message.into()));
        self.status.set(Status::Error);
        true
    }

    /// Restore defaults and cancel any in-flight write
    pub fn reset(&self) {
        self.epoch.bump();
        self.status.set(Status::Idle);
        self.data.set(None);
        self.error.set(None);
        self.last_updated.set(None);
    }

    /// One consistent combined read of the store's cells
    pub fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.get()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Default for StoreCore<T> {
    fn default() -> Self {
        Self::new()
    }
}
