use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::error::PrismResult;
use crate::reactive::Cell;
use crate::refresh::AutoRefresh;
use crate::remote::DocumentStore;
use crate::store::{Snapshot, StoreCore};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Collection holding task documents
pub const TASK_COLLECTION: &str = "tasks";
/// Ordering field of the task collection
pub const TASK_ORDER_FIELD: &str = "key";

/// One task document
///
/// `key` is `<list>/<id>`, so a prefix query on the list id returns the
/// list's tasks in key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDoc {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Task list store with optional auto-refresh
///
/// Loads the task list of the current list id from the document store.
/// The auto-refresh loop re-runs `load()` on a fixed interval against
/// whatever list id is current at tick time; switching lists while
/// refreshing does not restart the interval.
#[derive(Clone)]
pub struct TaskStore {
    core: StoreCore<Vec<TaskDoc>>,
    docs: Arc<dyn DocumentStore>,
    list_id: Cell<String>,
    refresh: AutoRefresh,
}

impl TaskStore {
    /// Create a store over `docs` with no list selected
    pub fn new(docs: Arc<dyn DocumentStore>) -> Self {
        Self {
            core: StoreCore::new(),
            docs,
            list_id: Cell::new(String::new()),
            refresh: AutoRefresh::new(),
        }
    }

    /// Switch to `list_id` and load its tasks
    ///
    /// An empty list id short-circuits to `reset()`.
    pub async fn load_list(&self, list_id: &str) {
        self.list_id.set(list_id.trim().to_string());
        self.load().await;
    }

    /// Reload the current list
    pub async fn load(&self) {
        let list_id = self.list_id.get();
        if list_id.is_empty() {
            self.core.reset();
            return;
        }

        let epoch = self.core.begin_load();

        #[cfg(feature = "tracing")]
        debug!(list = %list_id, "task list load started");

        let prefix = format!("{list_id}/");
        let result = self
            .docs
            .query_by_prefix(TASK_COLLECTION, TASK_ORDER_FIELD, &prefix)
            .await
            .and_then(|docs| {
                docs.into_iter()
                    .map(|doc| serde_json::from_value::<TaskDoc>(doc).map_err(Into::into))
                    .collect::<PrismResult<Vec<TaskDoc>>>()
            });

        match result {
            Ok(tasks) => {
                self.core.commit(epoch, tasks);
            }
            Err(err) => {
                self.core.fail(epoch, err.message());
            }
        }
    }

    /// Write a task through the document store, then reload
    ///
    /// The write error propagates to the caller; the reload after a
    /// successful write follows the normal load lifecycle.
    pub async fn put_task(&self, task: TaskDoc) -> PrismResult<()> {
        let doc = serde_json::to_value(&task)
            .map_err(|err| crate::error::PrismError::generic(err.to_string()))?;
        self.docs.put(TASK_COLLECTION, &task.key, doc).await?;
        self.load().await;
        Ok(())
    }

    /// Start reloading every `every`, beginning immediately
    pub fn start_auto_refresh(&self, every: Duration) {
        let store = self.clone();
        self.refresh.start(every, move || {
            let store = store.clone();
            async move { store.load().await }
        });
    }

    /// Stop the auto-refresh loop
    pub fn stop_auto_refresh(&self) {
        self.refresh.stop();
    }

    /// Whether the auto-refresh loop is active
    pub fn is_auto_refreshing(&self) -> bool {
        self.refresh.is_active()
    }

    /// Stop auto-refresh, then restore defaults
    pub fn reset(&self) {
        self.stop_auto_refresh();
        self.list_id.set(String::new());
        self.core.reset();
    }

    /// One consistent read of the store's state
    pub fn snapshot(&self) -> Snapshot<Vec<TaskDoc>> {
        self.core.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryDocumentStore;
    use crate::store::Status;
    use serde_json::json;
    use tokio::time::sleep;

    async fn seeded_store() -> (TaskStore, MemoryDocumentStore) {
        let docs = MemoryDocumentStore::new();
        for (key, title) in [
            ("work/001", "triage inbox"),
            ("work/002", "review patch"),
            ("home/001", "water plants"),
        ] {
            docs.put(
                TASK_COLLECTION,
                key,
                json!({"key": key, "title": title, "completed": false}),
            )
            .await
            .unwrap();
        }
        (TaskStore::new(Arc::new(docs.clone())), docs)
    }

    #[tokio::test]
    async fn test_load_list_commits_only_that_list() {
        let (store, _) = seeded_store().await;
        store.load_list("work").await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.status, Status::Ready);
        let tasks = snapshot.data.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].key, "work/001");
        assert_eq!(tasks[1].key, "work/002");
    }

    #[tokio::test]
    async fn test_empty_list_id_resets() {
        let (store, _) = seeded_store().await;
        store.load_list("work").await;
        store.load_list("").await;
        assert_eq!(store.snapshot().status, Status::Idle);
    }

    #[tokio::test]
    async fn test_malformed_document_lands_in_error_state() {
        let docs = MemoryDocumentStore::new();
        docs.put(TASK_COLLECTION, "work/001", json!({"key": "work/001"}))
            .await
            .unwrap();
        let store = TaskStore::new(Arc::new(docs));

        store.load_list("work").await;
        let snapshot = store.snapshot();
        assert_eq!(snapshot.status, Status::Error);
        assert!(snapshot.error.unwrap().starts_with("Malformed payload"));
    }

    #[tokio::test]
    async fn test_put_task_writes_through_and_reloads() {
        let (store, _) = seeded_store().await;
        store.load_list("work").await;

        store
            .put_task(TaskDoc {
                key: "work/003".to_string(),
                title: "ship release".to_string(),
                completed: false,
            })
            .await
            .unwrap();

        let tasks = store.snapshot().data.unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[2].title, "ship release");
    }

    #[tokio::test]
    async fn test_auto_refresh_picks_up_remote_changes() {
        let (store, docs) = seeded_store().await;
        store.load_list("work").await;
        store.start_auto_refresh(Duration::from_millis(25));
        assert!(store.is_auto_refreshing());

        docs.put(
            TASK_COLLECTION,
            "work/004",
            json!({"key": "work/004", "title": "new remote task", "completed": false}),
        )
        .await
        .unwrap();

        sleep(Duration::from_millis(70)).await;
        assert_eq!(store.snapshot().data.unwrap().len(), 3);
        store.stop_auto_refresh();
        assert!(!store.is_auto_refreshing());
    }

    #[tokio::test]
    async fn test_switching_lists_does_not_restart_interval() {
        // The loop keeps firing against whatever list is current.
        let (store, _) = seeded_store().await;
        store.load_list("work").await;
        store.start_auto_refresh(Duration::from_millis(25));

        store.load_list("home").await;
        sleep(Duration::from_millis(60)).await;

        let tasks = store.snapshot().data.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].key, "home/001");
        store.stop_auto_refresh();
    }

    #[tokio::test]
    async fn test_reset_stops_auto_refresh_first() {
        let (store, _) = seeded_store().await;
        store.load_list("work").await;
        store.start_auto_refresh(Duration::from_millis(20));

        store.reset();
        assert!(!store.is_auto_refreshing());
        assert_eq!(store.snapshot().status, Status::Idle);

        // No tick may revive the store after reset.
        sleep(Duration::from_millis(60)).await;
        assert_eq!(store.snapshot().status, Status::Idle);
    }
}
