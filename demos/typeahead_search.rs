//! # Typeahead Search Example
//!
//! Simulates a user typing into a tag input:
//!
//! 1. Seed the tag registry
//! 2. Type a prefix, arrow through the suggestions, commit with Enter
//! 3. Retype the same prefix and watch the cache answer synchronously
//!
//! Run with:
//! ```bash
//! cargo run --example typeahead_search
//! ```

use std::sync::Arc;

use prism::prelude::*;
use prism::{Key, KeyOutcome};

#[tokio::main]
async fn main() {
    println!("🚀 Typeahead search demo\n");

    let docs = MemoryDocumentStore::new();
    let registry = RegistryStore::new(Arc::new(docs));
    for tag in ["java", "javascript", "jam", "react", "rust"] {
        registry
            .add(CollectionKind::Tag, tag)
            .await
            .expect("seed tags");
    }

    let search = TypeaheadSearch::new(CollectionKind::Tag, registry.clone());

    // The user already has one tag and starts typing the next word.
    search.input("existing, ja").await;
    let state = search.selection_state();
    println!("⌨️  Typed 'existing, ja'");
    println!("   • suggestions: {:?}", state.suggestions);

    // Arrow down twice, commit with Enter.
    search.handle_key(Key::ArrowDown);
    search.handle_key(Key::ArrowDown);
    match search.handle_key(Key::Enter) {
        KeyOutcome::Committed(commit) => {
            println!("✅ Committed: '{}' (caret at {})", commit.value, commit.caret);
        }
        other => println!("unexpected outcome: {other:?}"),
    }

    // Same prefix again: served from the cache, no backend search.
    search.input("existing, javascript, ja").await;
    println!("\n⚡ Retyped 'ja': {:?}", search.selection_state().suggestions);

    // A registry mutation invalidates the cache wholesale.
    registry
        .add(CollectionKind::Tag, "jasmine")
        .await
        .expect("add tag");
    search.input("existing, javascript, ja").await;
    println!(
        "🔄 After adding 'jasmine': {:?}",
        search.selection_state().suggestions
    );

    println!("\n🎉 Done!");
}
