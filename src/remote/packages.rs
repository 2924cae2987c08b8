use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PrismError, PrismResult};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Resolved package metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name as requested
    pub name: String,
    /// Short description, if the registry has one
    pub description: Option<String>,
    /// Tag name to version, e.g. `latest -> 4.2.0`
    pub dist_tags: HashMap<String, String>,
}

/// Wire payload of `GET /<packageName>`
#[derive(Debug, Deserialize)]
struct PackagePayload {
    description: Option<String>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, String>,
}

/// Package registry lookup contract
///
/// One operation, no retries: `fetch` resolves a package name to its
/// metadata or fails. Any non-2xx response is a not-found by contract.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Resolve `name` to its registry metadata
    async fn fetch(&self, name: &str) -> PrismResult<PackageInfo>;
}

/// Registry client over HTTP
///
/// Issues `GET <base_url>/<name>` and deserializes the
/// `{description, dist-tags}` payload.
#[derive(Debug, Clone)]
pub struct HttpPackageRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPackageRegistry {
    /// Create a client against `base_url` (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PackageRegistry for HttpPackageRegistry {
    async fn fetch(&self, name: &str) -> PrismResult<PackageInfo> {
        let url = format!("{}/{name}", self.base_url);

        #[cfg(feature = "tracing")]
        debug!(package = name, %url, "fetching package metadata");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(PrismError::not_found(format!(
                "Package '{name}' not found"
            )));
        }

        let payload: PackagePayload = response.json().await?;
        Ok(PackageInfo {
            name: name.to_string(),
            description: payload.description,
            dist_tags: payload.dist_tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_deserialization() {
        let payload: PackagePayload = serde_json::from_str(
            r#"{"description": "A library", "dist-tags": {"latest": "1.2.3"}}"#,
        )
        .unwrap();
        assert_eq!(payload.description.as_deref(), Some("A library"));
        assert_eq!(payload.dist_tags["latest"], "1.2.3");
    }

    #[test]
    fn test_payload_tolerates_missing_fields() {
        let payload: PackagePayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.description, None);
        assert!(payload.dist_tags.is_empty());
    }
}
