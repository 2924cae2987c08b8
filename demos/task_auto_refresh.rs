//! # Task Auto-Refresh Example
//!
//! Polls a task list while another task mutates it remotely:
//!
//! 1. Seed a document store with a task list
//! 2. Start auto-refresh on a short interval
//! 3. Add tasks behind the store's back and watch the snapshot catch up
//!
//! Run with:
//! ```bash
//! cargo run --example task_auto_refresh
//! ```

use std::sync::Arc;

use prism::prelude::*;
use prism::TaskDoc;
use serde_json::json;
use tokio::time::{Duration, sleep};

#[tokio::main]
async fn main() {
    println!("🚀 Task auto-refresh demo\n");

    let docs = MemoryDocumentStore::new();
    for (key, title) in [("sprint/001", "triage inbox"), ("sprint/002", "review patch")] {
        docs.put(
            "tasks",
            key,
            json!({"key": key, "title": title, "completed": false}),
        )
        .await
        .expect("seeding cannot fail");
    }

    let store = TaskStore::new(Arc::new(docs.clone()));
    store.load_list("sprint").await;
    println!(
        "📋 Initial list: {} tasks",
        store.snapshot().data.map(|t| t.len()).unwrap_or_default()
    );

    store.start_auto_refresh(Duration::from_millis(100));
    println!("⏱️  Auto-refresh every 100ms\n");

    // Mutate the collection remotely while the store polls.
    for n in 3..=5 {
        sleep(Duration::from_millis(150)).await;
        let key = format!("sprint/00{n}");
        docs.put(
            "tasks",
            &key,
            json!({"key": key, "title": format!("task #{n}"), "completed": false}),
        )
        .await
        .expect("seeding cannot fail");

        let titles: Vec<String> = store
            .snapshot()
            .data
            .unwrap_or_default()
            .iter()
            .map(|task: &TaskDoc| task.title.clone())
            .collect();
        println!("   • snapshot now has {} tasks: {titles:?}", titles.len());
    }

    sleep(Duration::from_millis(150)).await;
    println!(
        "\n📋 Final list: {} tasks",
        store.snapshot().data.map(|t| t.len()).unwrap_or_default()
    );

    store.stop_auto_refresh();
    println!("🛑 Auto-refresh stopped: {}", !store.is_auto_refreshing());
    println!("\n🎉 Done!");
}
