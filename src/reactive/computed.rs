use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::cell::{Cell, Subscription};

/// Lazily-evaluated, memoized projection over one or more cells
///
/// A `Computed` wraps a pure closure. It recomputes on the first `get()`
/// after any tracked dependency changed, then serves the memoized value
/// until the next invalidation. `get()` never returns a stale value.
///
/// Dependencies are declared explicitly with [`Computed::track`]; the
/// closure itself is opaque, so an untracked cell read inside it will not
/// invalidate the projection.
pub struct Computed<T> {
    inner: Arc<ComputedInner<T>>,
}

struct ComputedInner<T> {
    compute: Box<dyn Fn() -> T + Send + Sync>,
    cached: RwLock<Option<T>>,
    dirty: Arc<AtomicBool>,
    // Keeps the dependency subscriptions alive for the projection's lifetime.
    subscriptions: Mutex<Vec<Subscription>>,
}

impl<T> Clone for Computed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Computed<T> {
    /// Create a projection from a pure compute closure
    ///
    /// The projection starts dirty: the first `get()` always computes.
    pub fn new(compute: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(ComputedInner {
                compute: Box::new(compute),
                cached: RwLock::new(None),
                dirty: Arc::new(AtomicBool::new(true)),
                subscriptions: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Mark this projection dirty whenever `cell` changes
    pub fn track<U: Clone + PartialEq + Send + Sync + 'static>(&self, cell: &Cell<U>) {
        let dirty = Arc::clone(&self.inner.dirty);
        let subscription = cell.subscribe(move || {
            dirty.store(true, Ordering::Release);
        });
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscription);
    }

    /// Get the projected value, recomputing if a dependency changed
    ///
    /// The dirty flag is cleared before the closure runs: a dependency
    /// change racing the recomputation re-dirties the projection, so the
    /// following `get()` recomputes again rather than serving the torn
    /// value forever.
    pub fn get(&self) -> T {
        let needs_compute = self.inner.dirty.swap(false, Ordering::AcqRel)
            || self
                .inner
                .cached
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .is_none();

        if needs_compute {
            let value = (self.inner.compute)();
            *self
                .inner
                .cached
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Some(value);
        }

        self.inner
            .cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| (self.inner.compute)())
    }

    /// Whether the next `get()` will recompute
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }
}

impl<T: Clone + std::fmt::Debug + Send + Sync + 'static> std::fmt::Debug for Computed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
