use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PrismResult;
use crate::remote::DocumentStore;
use crate::store::{Snapshot, StoreCore};

/// Collection holding prompt fragment documents
pub const FRAGMENT_COLLECTION: &str = "prompt_fragments";
/// Ordering field of the fragment collection
pub const FRAGMENT_ORDER_FIELD: &str = "section";

/// One reusable prompt fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFragment {
    /// Section the fragment belongs to, e.g. `intro`
    pub section: String,
    /// Short display label
    pub label: String,
    /// Fragment body
    pub text: String,
}

/// Prompt fragment registry store
///
/// Loads the fragments of one section at a time. Same lifecycle and
/// last-initiated-wins policy as every other store; an empty section
/// short-circuits to `reset()`.
#[derive(Clone)]
pub struct PromptFragmentStore {
    core: StoreCore<Vec<PromptFragment>>,
    docs: Arc<dyn DocumentStore>,
}

impl PromptFragmentStore {
    /// Create a store over `docs`
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self {
            core: StoreCore::new(),
            docs,
        }
    }

    /// Load the fragments of `section`
    pub async fn load(&self, section: &str) {
        let section = section.trim();
        if section.is_empty() {
            self.reset();
            return;
        }

        let epoch = self.core.begin_load();

        let result = self
            .docs
            .query_by_prefix(FRAGMENT_COLLECTION, FRAGMENT_ORDER_FIELD, section)
            .await
            .and_then(|docs| {
                docs.into_iter()
                    .map(|doc| serde_json::from_value::<PromptFragment>(doc).map_err(Into::into))
                    .collect::<PrismResult<Vec<PromptFragment>>>()
            });

        match result {
            Ok(fragments) => {
                self.core.commit(epoch, fragments);
            }
            Err(err) => {
                self.core.fail(epoch, err.message());
            }
        }
    }

    /// Restore defaults, cancelling any in-flight load
    pub fn reset(&self) {
        self.core.reset();
    }

    /// One consistent read of the store's state
    pub fn snapshot(&self) -> Snapshot<Vec<PromptFragment>> {
        self.core.snapshot()
    }
}
