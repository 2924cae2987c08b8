//! # Typeahead Search - Keystroke-Driven Suggestions
//!
//! Drives a [`RegistryStore`](crate::store::registry::RegistryStore) search
//! per keystroke and layers a keyboard-driven selection state machine on
//! top. The input value is a comma-separated word list; only the trailing
//! word is ever searched or replaced.
//!
//! ## 🎯 Core Concepts
//!
//! ### Current Word
//!
//! The searched prefix is the substring after the last comma, trimmed.
//! An empty current word closes the dropdown and clears the selection.
//!
//! ### Prefix Cache
//!
//! Resolved suggestion lists are cached per exact trimmed prefix, so
//! retyping a prefix serves synchronously with no flicker and no second
//! backend search. The cache belongs to exactly one consumer instance and
//! is cleared wholesale - a single atomic replace - whenever the shared
//! registry-changed counter has increased since the last observation.
//!
//! ### Guarded Resolution
//!
//! Every cache miss resolves under this consumer's own epoch guard: a
//! resolution superseded by a newer keystroke writes neither the cache nor
//! the visible suggestions, so a slow stale response can never overwrite a
//! faster newer one.
//!
//! ## ⌨️ Keyboard Protocol
//!
//! | Key | Effect |
//! |-----|--------|
//! | ArrowDown | Advance selection, saturating at the last suggestion |
//! | ArrowUp | Retreat selection, saturating at no-selection |
//! | Enter | Commit the selected suggestion, if any |
//! | Tab | Commit the first suggestion and suppress focus movement |
//! | Escape | Close without altering the text |
//!
//! Committing replaces only the trailing word, preserves the prior words
//! joined by `", "`, and notifies value subscribers with the full new
//! value.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::time::{Duration, sleep};

use crate::epoch::EpochGuard;
use crate::reactive::{Cell, Subscription};
use crate::store::registry::{ChangeCounter, CollectionKind, RegistryStore};

#[cfg(feature = "tracing")]
use tracing::debug;

/// How long a blur waits before closing the dropdown
///
/// Long enough for a pointer click on a suggestion to land first.
pub const BLUR_CLOSE_DELAY: Duration = Duration::from_millis(150);

/// Extract the word being typed: everything after the last comma, trimmed
pub fn current_word(value: &str) -> String {
    value.rsplit(',').next().unwrap_or("").trim().to_string()
}

/// Dropdown and selection state
///
/// Reset to the closed default on commit, blur, escape and empty input.
/// `selected` is `None` when no suggestion is highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub is_open: bool,
    pub suggestions: Vec<String>,
    pub selected: Option<usize>,
    pub search_prefix: String,
}

/// Keys the consumer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
    Escape,
}

/// Result of committing a suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full new input value
    pub value: String,
    /// Caret position after the commit (end of value)
    pub caret: usize,
}

/// What a key press did
///
/// `Handled` and `Committed` mean the caller must suppress the key's
/// default behavior (for Tab, the focus movement). `Ignored` keys proceed
/// normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Committed(Commit),
    Ignored,
}

/// Typeahead search consumer over one registry collection
///
/// Owns the input value cell, the selection state and the prefix cache.
/// Cloning shares all of them; a UI keeps one instance per input field.
#[derive(Clone)]
pub struct TypeaheadSearch {
    kind: CollectionKind,
    registry: RegistryStore,
    changed: ChangeCounter,
    seen_changes: Arc<AtomicU64>,
    value: Cell<String>,
    state: Cell<SelectionState>,
    cache: Arc<RwLock<HashMap<String, Vec<String>>>>,
    resolve_guard: EpochGuard,
    blur_guard: EpochGuard,
}

impl TypeaheadSearch {
    /// Create a consumer searching `kind` through `registry`
    pub fn new(kind: CollectionKind, registry: RegistryStore) -> Self {
        let changed = registry.change_counter();
        let seen = changed.value();
        Self {
            kind,
            registry,
            changed,
            seen_changes: Arc::new(AtomicU64::new(seen)),
            value: Cell::new(String::new()),
            state: Cell::new(SelectionState::default()),
            cache: Arc::new(RwLock::new(HashMap::new())),
            resolve_guard: EpochGuard::new(),
            blur_guard: EpochGuard::new(),
        }
    }

    /// Current input value
    pub fn value(&self) -> String {
        self.value.get()
    }

    /// Observe value changes (committed suggestions included)
    pub fn subscribe_value(&self, f: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.value.subscribe(f)
    }

    /// Current dropdown and selection state
    pub fn selection_state(&self) -> SelectionState {
        self.state.get()
    }

    /// Process one keystroke's worth of input
    ///
    /// Sets the value cell, re-checks the registry-changed counter, then
    /// resolves suggestions for the current word - synchronously on a
    /// cache hit, through the registry on a miss. A resolution superseded
    /// by a newer call leaves both cache and state untouched.
    pub async fn input(&self, new_value: &str) {
        self.value.set(new_value.to_string());
        // Typing cancels a pending deferred blur close.
        self.blur_guard.bump();
        self.invalidate_if_registry_changed();

        let word = current_word(new_value);
        if word.is_empty() {
            self.resolve_guard.bump();
            self.state.set(SelectionState::default());
            return;
        }

        if let Some(hit) = self.cache_get(&word) {
            #[cfg(feature = "tracing")]
            debug!(prefix = %word, "suggestion cache hit");
            // The hit answers this keystroke; any older in-flight
            // resolution is superseded.
            self.resolve_guard.bump();
            self.state.set(SelectionState {
                is_open: true,
                suggestions: hit,
                selected: None,
                search_prefix: word,
            });
            return;
        }

        // Keep the previous suggestions visible while resolving.
        let previous = self.state.get().suggestions;
        self.state.set(SelectionState {
            is_open: true,
            suggestions: previous,
            selected: None,
            search_prefix: word.clone(),
        });

        let epoch = self.resolve_guard.begin();
        let result = self.registry.search(self.kind, &word).await;
        if !self.resolve_guard.is_current(epoch) {
            return;
        }

        match result {
            Ok(suggestions) => {
                self.cache_put(&word, suggestions.clone());
                self.state.set(SelectionState {
                    is_open: true,
                    suggestions,
                    selected: None,
                    search_prefix: word,
                });
            }
            // A failed search shows no suggestions and caches nothing, so
            // the next keystroke retries the backend.
            Err(_err) => {
                #[cfg(feature = "tracing")]
                debug!(prefix = %word, error = %_err, "suggestion search failed");
                self.state.set(SelectionState {
                    is_open: true,
                    suggestions: Vec::new(),
                    selected: None,
                    search_prefix: word,
                });
            }
        }
    }

    /// Apply one key press to the selection state machine
    pub fn handle_key(&self, key: Key) -> KeyOutcome {
        let state = self.state.get();
        match key {
            Key::ArrowDown => {
                if !state.is_open || state.suggestions.is_empty() {
                    return KeyOutcome::Ignored;
                }
                let next = match state.selected {
                    None => 0,
                    Some(index) => (index + 1).min(state.suggestions.len() - 1),
                };
                self.state.set(SelectionState {
                    selected: Some(next),
                    ..state
                });
                KeyOutcome::Handled
            }
            Key::ArrowUp => {
                if !state.is_open {
                    return KeyOutcome::Ignored;
                }
                let next = match state.selected {
                    None | Some(0) => None,
                    Some(index) => Some(index - 1),
                };
                self.state.set(SelectionState {
                    selected: next,
                    ..state
                });
                KeyOutcome::Handled
            }
            Key::Enter => match state.selected {
                Some(index) if state.is_open => {
                    let suggestion = state.suggestions[index].clone();
                    KeyOutcome::Committed(self.select_suggestion(&suggestion))
                }
                _ => KeyOutcome::Ignored,
            },
            Key::Tab => {
                if state.is_open && !state.suggestions.is_empty() {
                    let first = state.suggestions[0].clone();
                    KeyOutcome::Committed(self.select_suggestion(&first))
                } else {
                    KeyOutcome::Ignored
                }
            }
            Key::Escape => {
                if !state.is_open {
                    return KeyOutcome::Ignored;
                }
                // A resolution still in flight must not reopen the
                // dropdown the user just dismissed.
                self.resolve_guard.bump();
                self.state.set(SelectionState::default());
                KeyOutcome::Handled
            }
        }
    }

    /// Commit `suggestion` in place of the trailing word
    ///
    /// Prior comma-separated words are preserved, re-joined with one space
    /// after each comma. The value cell is set (notifying subscribers with
    /// the full new value), the dropdown closes and the selection clears.
    /// The caller refocuses the input and places the caret at
    /// [`Commit::caret`].
    pub fn select_suggestion(&self, suggestion: &str) -> Commit {
        let value = self.value.get();
        let mut words: Vec<String> = value.split(',').map(|word| word.trim().to_string()).collect();
        if let Some(last) = words.last_mut() {
            *last = suggestion.to_string();
        }
        let new_value = words.join(", ");

        // An in-flight resolution for the replaced prefix must not reopen
        // the dropdown after the commit.
        self.resolve_guard.bump();
        self.value.set(new_value.clone());
        self.state.set(SelectionState::default());

        let caret = new_value.len();
        Commit {
            value: new_value,
            caret,
        }
    }

    /// Input lost focus: close after [`BLUR_CLOSE_DELAY`]
    ///
    /// The close is cancelled if the consumer reopens (new input) before
    /// the delay elapses.
    pub fn blur(&self) {
        let epoch = self.blur_guard.begin();
        let guard = self.blur_guard.clone();
        let resolve_guard = self.resolve_guard.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            sleep(BLUR_CLOSE_DELAY).await;
            if guard.is_current(epoch) {
                resolve_guard.bump();
                state.set(SelectionState::default());
            }
        });
    }

    /// Click landed outside the input: close immediately
    pub fn close_now(&self) {
        self.blur_guard.bump();
        self.resolve_guard.bump();
        self.state.set(SelectionState::default());
    }

    fn invalidate_if_registry_changed(&self) {
        let current = self.changed.value();
        if self.seen_changes.swap(current, Ordering::AcqRel) != current {
            #[cfg(feature = "tracing")]
            debug!("registry changed, clearing suggestion cache");
            *self
                .cache
                .write()
                .unwrap_or_else(PoisonError::into_inner) = HashMap::new();
        }
    }

    fn cache_get(&self, prefix: &str) -> Option<Vec<String>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(prefix)
            .cloned()
    }

    fn cache_put(&self, prefix: &str, suggestions: Vec<String>) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prefix.to_string(), suggestions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrismResult;
    use crate::remote::{DocumentStore, MemoryDocumentStore};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::AtomicU32;

    /// Document store wrapper counting and optionally delaying queries
    #[derive(Clone)]
    struct InstrumentedDocs {
        inner: MemoryDocumentStore,
        queries: Arc<AtomicU32>,
        delays: Arc<HashMap<String, u64>>,
    }

    impl InstrumentedDocs {
        fn new(inner: MemoryDocumentStore) -> Self {
            Self {
                inner,
                queries: Arc::new(AtomicU32::new(0)),
                delays: Arc::new(HashMap::new()),
            }
        }

        fn with_delays(mut self, delays: HashMap<String, u64>) -> Self {
            self.delays = Arc::new(delays);
            self
        }

        fn query_count(&self) -> u32 {
            self.queries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentStore for InstrumentedDocs {
        async fn get_by_key(&self, collection: &str, key: &str) -> PrismResult<Option<Value>> {
            self.inner.get_by_key(collection, key).await
        }

        async fn put(&self, collection: &str, key: &str, doc: Value) -> PrismResult<()> {
            self.inner.put(collection, key, doc).await
        }

        async fn query_by_prefix(
            &self,
            collection: &str,
            order_field: &str,
            prefix: &str,
        ) -> PrismResult<Vec<Value>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if let Some(millis) = self.delays.get(prefix) {
                sleep(Duration::from_millis(*millis)).await;
            }
            self.inner.query_by_prefix(collection, order_field, prefix).await
        }
    }

    async fn seeded_registry() -> (RegistryStore, InstrumentedDocs) {
        let docs = InstrumentedDocs::new(MemoryDocumentStore::new());
        let registry = RegistryStore::new(Arc::new(docs.clone()));
        for name in ["java", "javascript", "react", "rust"] {
            registry.add(CollectionKind::Tag, name).await.unwrap();
        }
        (registry, docs)
    }

    #[test]
    fn test_current_word_extraction() {
        assert_eq!(current_word("javascript, react"), "react");
        assert_eq!(current_word("javascript, react, "), "");
        assert_eq!(current_word("tag1 , tag2"), "tag2");
        assert_eq!(current_word("solo"), "solo");
        assert_eq!(current_word(""), "");
    }

    #[tokio::test]
    async fn test_input_opens_with_suggestions() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        let state = search.selection_state();
        assert!(state.is_open);
        assert_eq!(state.suggestions, vec!["java", "javascript"]);
        assert_eq!(state.selected, None);
        assert_eq!(state.search_prefix, "ja");
    }

    #[tokio::test]
    async fn test_empty_current_word_closes() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("javascript, re").await;
        assert!(search.selection_state().is_open);

        search.input("javascript, ").await;
        let state = search.selection_state();
        assert_eq!(state, SelectionState::default());
    }

    #[tokio::test]
    async fn test_keyboard_selection_saturates() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);
        // "r" matches react and rust; seed a third with another prefix hit
        registry_with_three(&search).await;

        let mut observed = Vec::new();
        for _ in 0..4 {
            search.handle_key(Key::ArrowDown);
            observed.push(search.selection_state().selected);
        }
        assert_eq!(observed, vec![Some(0), Some(1), Some(2), Some(2)]);

        search.handle_key(Key::ArrowUp);
        assert_eq!(search.selection_state().selected, Some(1));

        search.handle_key(Key::ArrowUp);
        search.handle_key(Key::ArrowUp);
        assert_eq!(search.selection_state().selected, None);

        // Saturates at no-selection.
        search.handle_key(Key::ArrowUp);
        assert_eq!(search.selection_state().selected, None);
    }

    /// Open the dropdown with exactly three suggestions
    async fn registry_with_three(search: &TypeaheadSearch) {
        search.registry.add(CollectionKind::Tag, "jam").await.unwrap();
        search.input("ja").await;
        assert_eq!(search.selection_state().suggestions.len(), 3);
    }

    #[tokio::test]
    async fn test_commit_replaces_trailing_word() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("existing, ja").await;
        let commit = search.select_suggestion("javascript");

        assert_eq!(commit.value, "existing, javascript");
        assert_eq!(commit.caret, "existing, javascript".len());
        assert_eq!(search.value(), "existing, javascript");
        let state = search.selection_state();
        assert!(!state.is_open);
        assert_eq!(state.selected, None);
    }

    #[tokio::test]
    async fn test_commit_notifies_value_subscribers() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);
        let notified = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&notified);
        let _sub = search.subscribe_value(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        search.input("ja").await;
        let before = notified.load(Ordering::SeqCst);
        search.select_suggestion("javascript");
        assert_eq!(notified.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test]
    async fn test_enter_commits_selected_suggestion() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        assert_eq!(search.handle_key(Key::Enter), KeyOutcome::Ignored);

        search.handle_key(Key::ArrowDown);
        search.handle_key(Key::ArrowDown);
        match search.handle_key(Key::Enter) {
            KeyOutcome::Committed(commit) => assert_eq!(commit.value, "javascript"),
            other => panic!("expected commit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tab_commits_first_suggestion() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        match search.handle_key(Key::Tab) {
            KeyOutcome::Committed(commit) => assert_eq!(commit.value, "java"),
            other => panic!("expected commit, got {other:?}"),
        }

        // With nothing open, Tab falls through to default focus movement.
        assert_eq!(search.handle_key(Key::Tab), KeyOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_escape_closes_without_altering_text() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        search.handle_key(Key::ArrowDown);
        assert_eq!(search.handle_key(Key::Escape), KeyOutcome::Handled);

        assert_eq!(search.selection_state(), SelectionState::default());
        assert_eq!(search.value(), "ja");
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_prefix_without_backend() {
        let (registry, docs) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        let after_first = docs.query_count();

        search.input("javascript, x").await;
        let after_other = docs.query_count();
        assert!(after_other > after_first);

        search.input("ja").await;
        assert_eq!(docs.query_count(), after_other);
        assert_eq!(
            search.selection_state().suggestions,
            vec!["java", "javascript"]
        );
    }

    #[tokio::test]
    async fn test_registry_change_invalidates_cache() {
        let (registry, docs) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry.clone());

        search.input("ja").await;
        let cached_at = docs.query_count();

        // Mutating the registry bumps the shared counter.
        registry.add(CollectionKind::Tag, "jasmine").await.unwrap();

        search.input("ja").await;
        assert_eq!(docs.query_count(), cached_at + 1);
        assert!(
            search
                .selection_state()
                .suggestions
                .contains(&"jasmine".to_string())
        );
    }

    #[tokio::test]
    async fn test_stale_resolution_discarded() {
        // The resolution for "r" is slower than the one for "ja" typed
        // after it; the slow result must not overwrite the fresh one.
        let docs = InstrumentedDocs::new(MemoryDocumentStore::new())
            .with_delays(HashMap::from([("r".to_string(), 80)]));
        let registry = RegistryStore::new(Arc::new(docs.clone()));
        for name in ["java", "javascript", "react", "rust"] {
            registry.add(CollectionKind::Tag, name).await.unwrap();
        }
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        let slow = {
            let search = search.clone();
            tokio::spawn(async move { search.input("r").await })
        };
        sleep(Duration::from_millis(10)).await;
        search.input("ja").await;
        slow.await.unwrap();

        let state = search.selection_state();
        assert_eq!(state.search_prefix, "ja");
        assert_eq!(state.suggestions, vec!["java", "javascript"]);
        assert_eq!(search.cache_get("r"), None);
    }

    #[tokio::test]
    async fn test_cache_hit_supersedes_inflight_resolution() {
        // Prefix "ja" is pre-warmed; while "r" is still resolving, a cache
        // hit answers the next keystroke and the slow result must stay
        // discarded.
        let docs = InstrumentedDocs::new(MemoryDocumentStore::new())
            .with_delays(HashMap::from([("r".to_string(), 80)]));
        let registry = RegistryStore::new(Arc::new(docs.clone()));
        for name in ["java", "javascript", "react"] {
            registry.add(CollectionKind::Tag, name).await.unwrap();
        }
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        let slow = {
            let search = search.clone();
            tokio::spawn(async move { search.input("r").await })
        };
        sleep(Duration::from_millis(10)).await;
        search.input("ja").await;
        slow.await.unwrap();

        let state = search.selection_state();
        assert_eq!(state.search_prefix, "ja");
        assert_eq!(state.suggestions, vec!["java", "javascript"]);
    }

    #[tokio::test]
    async fn test_escape_discards_inflight_resolution() {
        let docs = InstrumentedDocs::new(MemoryDocumentStore::new())
            .with_delays(HashMap::from([("r".to_string(), 50)]));
        let registry = RegistryStore::new(Arc::new(docs.clone()));
        registry.add(CollectionKind::Tag, "react").await.unwrap();
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        let slow = {
            let search = search.clone();
            tokio::spawn(async move { search.input("r").await })
        };
        sleep(Duration::from_millis(10)).await;
        search.handle_key(Key::Escape);
        slow.await.unwrap();

        assert!(!search.selection_state().is_open);
    }

    #[tokio::test]
    async fn test_blur_closes_after_delay() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        search.blur();
        assert!(search.selection_state().is_open);

        sleep(BLUR_CLOSE_DELAY + Duration::from_millis(30)).await;
        assert!(!search.selection_state().is_open);
    }

    #[tokio::test]
    async fn test_reopening_cancels_deferred_blur_close() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        search.blur();
        search.input("jav").await;

        sleep(BLUR_CLOSE_DELAY + Duration::from_millis(30)).await;
        assert!(search.selection_state().is_open);
    }

    #[tokio::test]
    async fn test_outside_click_closes_immediately() {
        let (registry, _) = seeded_registry().await;
        let search = TypeaheadSearch::new(CollectionKind::Tag, registry);

        search.input("ja").await;
        search.close_now();
        assert_eq!(search.selection_state(), SelectionState::default());
    }
}
