use std::sync::Arc;

use crate::remote::{PackageInfo, PackageRegistry};
use crate::store::{Snapshot, StoreCore};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Package lookup store
///
/// Resolves one package name at a time against an injected
/// [`PackageRegistry`]. Overlapping lookups follow last-initiated-wins;
/// a lookup for an empty name short-circuits to `reset()`.
#[derive(Clone)]
pub struct PackageStore {
    core: StoreCore<PackageInfo>,
    registry: Arc<dyn PackageRegistry>,
}

impl PackageStore {
    /// Create a store over `registry`
    pub fn new(registry: Arc<dyn PackageRegistry>) -> Self {
        Self {
            core: StoreCore::new(),
            registry,
        }
    }

    /// Look up `name`, committing the result if still current
    ///
    /// Whitespace-only names reset the store instead of fetching.
    /// Not-found and transport failures both land in `Status::Error` with
    /// their message; the store never retries.
    pub async fn load(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            self.reset();
            return;
        }

        let epoch = self.core.begin_load();

        #[cfg(feature = "tracing")]
        debug!(package = name, "package lookup started");

        match self.registry.fetch(name).await {
            Ok(info) => {
                self.core.commit(epoch, info);
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                warn!(package = name, error = %err, "package lookup failed");
                self.core.fail(epoch, err.message());
            }
        }
    }

    /// Restore defaults, cancelling any in-flight lookup
    pub fn reset(&self) {
        self.core.reset();
    }

    /// One consistent read of the store's state
    pub fn snapshot(&self) -> Snapshot<PackageInfo> {
        self.core.snapshot()
    }
}
