//! # Auto-Refresh - Cancellable Periodic Loads
//!
//! Wraps a store's `load` in a spawned interval loop. `start` fires one
//! immediate load, then repeats on a fixed interval until `stop` or a
//! newer `start` supersedes it. Cancellation is a generation counter, not
//! task aborting: a superseded loop observes the newer generation on its
//! next tick and exits on its own.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::time::{Duration, MissedTickBehavior, interval};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Periodic refresh driver for one store
///
/// Holds no timer handle; the spawned loop is gated by a shared generation
/// counter. Cloning shares the counter, so any clone can stop the loop.
#[derive(Debug, Clone, Default)]
pub struct AutoRefresh {
    generation: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
}

impl AutoRefresh {
    /// Create an inactive driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Start refreshing: one immediate load, then one per `every`
    ///
    /// Any previously started loop is superseded before the new one runs.
    /// The refresh closure is invoked against whatever key the store holds
    /// at tick time; changing the key does not restart the interval.
    pub fn start<F, Fut>(&self, every: Duration, refresh: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.active.store(true, Ordering::Release);

        let counter = Arc::clone(&self.generation);
        tokio::spawn(async move {
            #[cfg(feature = "tracing")]
            debug!(interval_ms = every.as_millis() as u64, "auto-refresh started");

            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // The first tick of a fresh interval completes immediately,
                // which gives the required load-on-start.
                ticker.tick().await;
                if counter.load(Ordering::Acquire) != generation {
                    break;
                }
                refresh().await;
            }

            #[cfg(feature = "tracing")]
            debug!("auto-refresh loop exited");
        });
    }

    /// Stop refreshing
    ///
    /// The running loop exits at its next tick; no further loads are
    /// initiated.
    pub fn stop(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.active.store(false, Ordering::Release);
    }

    /// Whether a refresh loop is currently active
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_start_fires_immediately_then_periodically() {
        let refresh = AutoRefresh::new();
        let count = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&count);
        refresh.start(Duration::from_millis(30), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert!(refresh.is_active());

        sleep(Duration::from_millis(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sleep(Duration::from_millis(80)).await;
        assert!(count.load(Ordering::SeqCst) >= 3);
        refresh.stop();
    }

    #[tokio::test]
    async fn test_stop_halts_further_loads() {
        let refresh = AutoRefresh::new();
        let count = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&count);
        refresh.start(Duration::from_millis(20), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        sleep(Duration::from_millis(10)).await;
        refresh.stop();
        assert!(!refresh.is_active());

        let at_stop = count.load(Ordering::SeqCst);
        sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_stop);
    }

    #[tokio::test]
    async fn test_restart_supersedes_previous_loop() {
        let refresh = AutoRefresh::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&first);
        refresh.start(Duration::from_millis(20), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        sleep(Duration::from_millis(5)).await;

        let counter = Arc::clone(&second);
        refresh.start(Duration::from_millis(20), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        sleep(Duration::from_millis(70)).await;
        refresh.stop();

        let first_total = first.load(Ordering::SeqCst);
        sleep(Duration::from_millis(40)).await;
        assert_eq!(first.load(Ordering::SeqCst), first_total);
        assert!(second.load(Ordering::SeqCst) >= 2);
    }
}
