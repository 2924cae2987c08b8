//! # Package Lookup Example
//!
//! Demonstrates the package store against a fake in-process registry:
//!
//! 1. A lookup commits package metadata into the snapshot
//! 2. A lookup for an unknown package lands in the error state
//! 3. Two overlapping lookups: the most recently initiated one wins,
//!    even though the first one resolves later
//!
//! Run with:
//! ```bash
//! cargo run --example package_lookup
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use prism::prelude::*;
use prism::PackageInfo;
use tokio::time::{Duration, sleep};

/// In-process registry with a configurable delay per package
struct DemoRegistry;

#[async_trait]
impl PackageRegistry for DemoRegistry {
    async fn fetch(&self, name: &str) -> PrismResult<PackageInfo> {
        // "slow-" packages take a while, everything else is instant.
        if name.starts_with("slow-") {
            sleep(Duration::from_millis(150)).await;
        }
        if name == "does-not-exist" {
            return Err(PrismError::not_found(format!(
                "Package '{name}' not found"
            )));
        }
        Ok(PackageInfo {
            name: name.to_string(),
            description: Some(format!("The {name} package")),
            dist_tags: HashMap::from([("latest".to_string(), "2.1.0".to_string())]),
        })
    }
}

#[tokio::main]
async fn main() {
    println!("🚀 Package lookup demo\n");

    let store = PackageStore::new(Arc::new(DemoRegistry));

    // 1. Plain lookup
    store.load("react").await;
    let snapshot = store.snapshot();
    println!("📦 Lookup 'react': {:?}", snapshot.status);
    if let Some(info) = snapshot.data {
        println!("   • description: {}", info.description.unwrap_or_default());
        println!("   • latest: {}\n", info.dist_tags["latest"]);
    }

    // 2. Unknown package
    store.load("does-not-exist").await;
    let snapshot = store.snapshot();
    println!("❓ Lookup 'does-not-exist': {:?}", snapshot.status);
    println!("   • error: {}\n", snapshot.error.unwrap_or_default());

    // 3. Overlapping lookups: last initiated wins
    println!("🏁 Racing 'slow-lodash' against 'express'...");
    let racer = {
        let store = store.clone();
        tokio::spawn(async move { store.load("slow-lodash").await })
    };
    sleep(Duration::from_millis(20)).await;
    store.load("express").await;
    racer.await.expect("lookup task panicked");

    let snapshot = store.snapshot();
    println!(
        "   • visible package: {} ({:?})",
        snapshot.data.map(|info| info.name).unwrap_or_default(),
        snapshot.status,
    );
    println!("   • the slow lookup resolved later and was discarded");

    println!("\n🎉 Done!");
}
