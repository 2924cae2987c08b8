//! # Reactive Primitives - Cells and Computed Projections
//!
//! This module provides the change-tracking primitives that every Prism
//! store is built from:
//!
//! - [`Cell`]: a shared, version-tracked value with synchronous reads,
//!   change notification and RAII unsubscription.
//! - [`Computed`]: a lazily-evaluated, memoized value derived from one or
//!   more cells via dirty-flag-plus-pull invalidation.
//! - [`Subscription`]: guard that removes its callback on drop.
//!
//! ## 🎯 Core Concepts
//!
//! ### Cells - Synchronous, Observable State
//!
//! A [`Cell`] holds one current value. `get()` returns it synchronously and
//! never suspends; `set()` replaces it and, only if it actually changed,
//! bumps the version and notifies subscribers in registration order.
//! Setting an equal value is a complete no-op.
//!
//! ### Computed - Derived Reads Without Flicker
//!
//! A [`Computed`] wraps a pure closure over one or more cells. Call
//! `track()` once per dependency; any change to a tracked cell marks the
//! projection dirty, and the next `get()` recomputes and re-memoizes.
//! `get()` never returns a stale value.
//!
//! ## 🔒 Thread Safety
//!
//! Both primitives use `Arc<RwLock<_>>` interior mutability and are
//! `Send + Sync`. Notification runs outside the value lock, so a
//! subscriber may freely read the cell it is subscribed to.
//!
//! No errors occur at this layer; it is pure bookkeeping.

pub mod cell;
pub mod computed;

pub use cell::{Cell, Subscription};
pub use computed::Computed;
