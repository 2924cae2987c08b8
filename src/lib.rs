//! # Prism: Reactive Async State Stores in Rust
//!
//! Prism exposes derived, always-consistent snapshots of remote-fetched or
//! locally-computed data to presentation code, while guaranteeing that
//! concurrent or superseded fetches never corrupt visible state.
//!
//! ## 🚀 Quick Start
//!
//! Construct a domain store over an injected backend, call `load`, and
//! read one consistent `Snapshot` - status, data, error and timestamp
//! combined. Overlapping loads are safe by construction: the most recently
//! initiated call wins, always.
//!
//! ## 🎯 Core Concepts
//!
//! ### Cells and Projections - Reactive Bookkeeping
//!
//! A [`Cell`] holds one synchronously readable value and notifies
//! subscribers on change. A [`Computed`] projection derives from one or
//! more cells, memoized until a dependency invalidates it. Stores compose
//! their cells into a single snapshot projection, so consumers can never
//! observe a half-applied transition.
//!
//! ### Epochs - Races Resolved by Counter
//!
//! Every store owns an [`EpochGuard`]. A load captures the epoch it was
//! issued under and commits only if that epoch is still current; stale
//! results are silently discarded. No transport-level aborting, no locks -
//! the counter is the whole correctness mechanism.
//!
//! ### Stores - One Lifecycle per Domain
//!
//! Each domain store embeds the same [`StoreCore`] state machine
//! (idle → loading → ready | error) and adds its domain semantics on top:
//! package lookup, task lists with auto-refresh, the category/tag/concept
//! registry, prompt fragments, segmented choices and upload links.
//!
//! ### Typeahead - Suggestions Without Flicker
//!
//! [`TypeaheadSearch`] drives a registry search per keystroke, caches
//! suggestion lists per exact prefix, and layers a keyboard-driven
//! selection state machine on top. The cache clears wholesale whenever the
//! shared registry-changed counter increases.
//!
//! ## 📚 Module Overview
//!
//! - **[`reactive`]**: [`Cell`], [`Computed`] and [`Subscription`]
//! - **[`epoch`]**: [`EpochGuard`] cooperative cancellation
//! - **[`store`]**: [`StoreCore`] plus the six domain stores
//! - **[`typeahead`]**: [`TypeaheadSearch`] consumer
//! - **[`refresh`]**: [`AutoRefresh`] periodic load driver
//! - **[`remote`]**: [`DocumentStore`] and [`PackageRegistry`] seams
//! - **[`error`]**: [`PrismError`] and [`PrismResult`]
//!
//! ## Concurrency Model
//!
//! Store mutations are synchronous on the calling task; async operations
//! suspend only at their own await points. Visible state always reflects
//! the most recently *initiated* operation that has resolved - never an
//! older one resolving later. A hung fetch leaves `Loading` until
//! superseded; there are no timeouts and no retries.

pub mod epoch;
pub mod error;
pub mod reactive;
pub mod refresh;
pub mod remote;
pub mod store;
pub mod typeahead;

// Core public API - simplified imports
pub use epoch::{Epoch, EpochGuard};
pub use error::{PrismError, PrismResult};
pub use reactive::{Cell, Computed, Subscription};
pub use refresh::AutoRefresh;
pub use remote::{
    DocumentStore, HttpPackageRegistry, MemoryDocumentStore, PackageInfo, PackageRegistry,
};
pub use store::choice::SegmentedChoiceStore;
pub use store::package::PackageStore;
pub use store::prompts::{PromptFragment, PromptFragmentStore};
pub use store::registry::{
    ChangeCounter, CollectionKind, RegistryLists, RegistryStore, Validation, validate_category,
    validate_concept, validate_name, validate_tag,
};
pub use store::tasks::{TaskDoc, TaskStore};
pub use store::upload::{
    LinkProvider, SimulatedLinkProvider, UploadLink, UploadLinkStore, validate_file_name,
};
pub use store::{Snapshot, Status, StoreCore};
pub use typeahead::{Commit, Key, KeyOutcome, SelectionState, TypeaheadSearch};

// Convenience re-exports for common patterns
pub mod prelude {
    //! Simplified imports for common usage patterns
    //!
    //! Use `use prism::prelude::*;` to import the most commonly used types
    //! and traits.

    pub use crate::{
        Cell, CollectionKind, Computed, DocumentStore, EpochGuard, MemoryDocumentStore,
        PackageRegistry, PackageStore, PrismError, PrismResult, RegistryStore, Snapshot, Status,
        StoreCore, TaskStore, TypeaheadSearch,
    };

    // Re-export async_trait for convenience
    pub use async_trait::async_trait;
}
