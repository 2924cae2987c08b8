use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// Subscriber callback, invoked after a cell's value actually changed
type Callback = Arc<dyn Fn() + Send + Sync>;

/// Shared, version-tracked value with change notification
///
/// `Cell` is the leaf primitive of the store layer. Reads are synchronous
/// and never suspend; writes replace the value and notify subscribers only
/// when the value actually changed. Cloning a `Cell` clones the handle, not
/// the value - all clones observe the same state.
///
/// Cells are mutated only through their owning store's operations; the
/// store composes them into a consistent [`Computed`](super::Computed)
/// snapshot.
pub struct Cell<T> {
    inner: Arc<CellInner<T>>,
}

struct CellInner<T> {
    value: RwLock<T>,
    version: AtomicU64,
    subscribers: RwLock<Vec<(u64, Callback)>>,
    next_subscriber_id: AtomicU64,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self
            .inner
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Cell")
            .field("value", &*value)
            .field("version", &self.inner.version.load(Ordering::Acquire))
            .finish()
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Cell<T> {
    /// Create a new cell holding `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(CellInner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
                subscribers: RwLock::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(0),
            }),
        }
    }

    /// Get the current value synchronously
    ///
    /// Never suspends and never observes a partially-applied write.
    pub fn get(&self) -> T {
        self.inner
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let value = self
            .inner
            .value
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&value)
    }

    /// Replace the value, notifying subscribers if it changed
    ///
    /// Setting a value equal to the current one is a no-op: no version
    /// bump, no notifications. Notification runs after the value lock is
    /// released, in subscriber registration order.
    pub fn set(&self, value: T) {
        {
            let mut current = self
                .inner
                .value
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if *current == value {
                return;
            }
            *current = value;
            self.inner.version.fetch_add(1, Ordering::Release);
        }
        self.notify();
    }

    /// Monotonic change counter, bumped once per effective `set`
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Register a change callback, removed when the guard drops
    ///
    /// The callback fires after every effective `set`. It must not call
    /// `set` on the same cell (re-entrant notification is not supported);
    /// reading the cell from the callback is fine.
    pub fn subscribe(&self, f: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(f)));

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = Weak::upgrade(&weak) {
                    inner
                        .subscribers
                        .write()
                        .unwrap_or_else(PoisonError::into_inner)
                        .retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    fn notify(&self) {
        // Snapshot the callback list so subscribers can read the cell
        // without deadlocking on the subscriber lock.
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for cb in callbacks {
            cb();
        }
    }
}

impl<T: Clone + PartialEq + Default + Send + Sync + 'static> Default for Cell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Guard that unsubscribes its callback when dropped
///
/// Returned by [`Cell::subscribe`]. Dropping it removes the callback before
/// the next notification cycle. Call [`Subscription::forget`] to leave the
/// callback attached for the cell's lifetime.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Detach the guard, leaving the callback subscribed forever
    pub fn forget(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
