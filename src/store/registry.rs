use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use serde_json::json;

use crate::error::{PrismError, PrismResult};
use crate::remote::DocumentStore;
use crate::store::{Snapshot, StoreCore};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Longest accepted registry name
pub const MAX_NAME_LEN: usize = 50;

/// The three registry collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Category,
    Tag,
    Concept,
}

impl CollectionKind {
    /// Document collection backing this kind
    pub fn collection(&self) -> &'static str {
        match self {
            CollectionKind::Category => "categories",
            CollectionKind::Tag => "tags",
            CollectionKind::Concept => "concepts",
        }
    }

    /// Field the collection is ordered and prefix-matched on
    pub fn order_field(&self) -> &'static str {
        "name"
    }

    /// Display noun used in validation messages
    pub fn noun(&self) -> &'static str {
        match self {
            CollectionKind::Category => "Category",
            CollectionKind::Tag => "Tag",
            CollectionKind::Concept => "Concept",
        }
    }
}

/// Local validation outcome
///
/// Validation never reaches a store's error state; the caller inspects
/// this result and decides whether to proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Validate a registry name against the local shape rules
///
/// Rules, checked in order: non-empty after trimming, no commas (the
/// typeahead's word separator), at most [`MAX_NAME_LEN`] characters.
pub fn validate_name(kind: CollectionKind, name: &str) -> Validation {
    let noun = kind.noun();
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Validation::invalid(format!("{noun} cannot be empty"));
    }
    if trimmed.contains(',') {
        return Validation::invalid(format!("{noun} cannot contain commas"));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Validation::invalid(format!("{noun} cannot exceed {MAX_NAME_LEN} characters"));
    }
    Validation::ok()
}

/// Validate a category name
pub fn validate_category(name: &str) -> Validation {
    validate_name(CollectionKind::Category, name)
}

/// Validate a tag name
pub fn validate_tag(name: &str) -> Validation {
    validate_name(CollectionKind::Tag, name)
}

/// Validate a concept name
pub fn validate_concept(name: &str) -> Validation {
    validate_name(CollectionKind::Concept, name)
}

/// Shared counter bumped on every registry mutation
///
/// Consumers (the typeahead's prefix cache) watch the value and invalidate
/// wholesale on any increase. Cloning shares the counter.
#[derive(Debug, Clone, Default)]
pub struct ChangeCounter {
    value: Arc<AtomicU64>,
}

impl ChangeCounter {
    /// Create a counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one mutation
    pub fn increment(&self) {
        self.value.fetch_add(1, Ordering::AcqRel);
    }

    /// Current value
    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

/// Combined view of all three registry collections
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistryLists {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub concepts: Vec<String>,
}

/// Category/tag/concept registry store
///
/// Search and existence checks go straight to the document store; the
/// embedded core carries the combined `load_all` lifecycle. Every
/// successful `add` bumps the shared [`ChangeCounter`].
#[derive(Clone)]
pub struct RegistryStore {
    core: StoreCore<RegistryLists>,
    docs: Arc<dyn DocumentStore>,
    changed: ChangeCounter,
}

impl RegistryStore {
    /// Create a store over `docs`
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self {
            core: StoreCore::new(),
            docs,
            changed: ChangeCounter::new(),
        }
    }

    /// Handle to the shared registry-changed counter
    pub fn change_counter(&self) -> ChangeCounter {
        self.changed.clone()
    }

    /// Names of `kind` starting with `prefix`, ascending
    pub async fn search(&self, kind: CollectionKind, prefix: &str) -> PrismResult<Vec<String>> {
        let docs = self
            .docs
            .query_by_prefix(kind.collection(), kind.order_field(), prefix)
            .await?;

        Ok(docs
            .iter()
            .filter_map(|doc| doc.get(kind.order_field()).and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect())
    }

    /// Whether `name` is already registered under `kind`
    ///
    /// Fails open: any remote error degrades to `false` rather than
    /// surfacing an error state, so restrictive remote permissions never
    /// block the user. Callers that must distinguish absence from failure
    /// use [`RegistryStore::search`] and handle the error themselves.
    pub async fn exists(&self, kind: CollectionKind, name: &str) -> bool {
        match self.docs.get_by_key(kind.collection(), name.trim()).await {
            Ok(found) => found.is_some(),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                warn!(kind = kind.noun(), error = %_err, "existence check degraded to false");
                false
            }
        }
    }

    /// Validate and register `name` under `kind`
    ///
    /// Returns the validation message as a `Validation` error without
    /// touching the store's state; remote failures propagate. A successful
    /// write bumps the shared change counter.
    pub async fn add(&self, kind: CollectionKind, name: &str) -> PrismResult<()> {
        let validation = validate_name(kind, name);
        if let Some(message) = validation.error {
            return Err(PrismError::validation(message));
        }

        let name = name.trim();
        self.docs
            .put(kind.collection(), name, json!({ "name": name }))
            .await?;
        self.changed.increment();

        #[cfg(feature = "tracing")]
        debug!(kind = kind.noun(), name, "registry entry added");
        Ok(())
    }

    /// Load all three collections concurrently into one snapshot
    pub async fn load_all(&self) {
        let epoch = self.core.begin_load();

        let kinds = [
            CollectionKind::Category,
            CollectionKind::Tag,
            CollectionKind::Concept,
        ];
        let results = join_all(kinds.iter().map(|kind| self.search(*kind, ""))).await;

        let mut lists = RegistryLists::default();
        for (kind, result) in kinds.iter().zip(results) {
            let names = match result {
                Ok(names) => names,
                Err(err) => {
                    self.core.fail(epoch, err.message());
                    return;
                }
            };
            match kind {
                CollectionKind::Category => lists.categories = names,
                CollectionKind::Tag => lists.tags = names,
                CollectionKind::Concept => lists.concepts = names,
            }
        }
        self.core.commit(epoch, lists);
    }

    /// Restore defaults, cancelling any in-flight load
    pub fn reset(&self) {
        self.core.reset();
    }

    /// One consistent read of the combined registry state
    pub fn snapshot(&self) -> Snapshot<RegistryLists> {
        self.core.snapshot()
    }
}
