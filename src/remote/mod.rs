//! # Remote Boundaries - Document Store and Package Registry
//!
//! This module holds the only two contracts Prism consumes but does not
//! implement: a remote document database and a package registry service.
//! Both are modeled as async traits so stores receive them by injection
//! and tests substitute in-process fakes.
//!
//! ## 🎯 Purpose
//!
//! Domain stores never talk to a transport directly. They hold an
//! `Arc<dyn DocumentStore>` or `Arc<dyn PackageRegistry>` and leave the
//! wire details to the implementation behind the seam. Neither contract
//! retries or backs off - failures surface immediately.
//!
//! ## 📋 Contract Reference
//!
//! | Operation | Contract |
//! |-----------|----------|
//! | `get_by_key` | One document or absent |
//! | `put` | Upsert by collection + key |
//! | `query_by_prefix` | Prefix-matched on the order field, sorted ascending |
//! | `fetch` (registry) | `GET /<name>`, any non-2xx treated as not-found |
//!
//! ## 🔧 Included Implementations
//!
//! - [`MemoryDocumentStore`]: thread-safe in-memory backend for tests and
//!   demos.
//! - [`HttpPackageRegistry`]: reqwest-backed registry client.

pub mod docstore;
pub mod packages;

pub use docstore::{DocumentStore, MemoryDocumentStore};
pub use packages::{HttpPackageRegistry, PackageInfo, PackageRegistry};
