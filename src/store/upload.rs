use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, sleep};

use crate::error::PrismResult;
use crate::store::registry::Validation;
use crate::store::{Snapshot, StoreCore};

/// Longest accepted file name
pub const MAX_FILE_NAME_LEN: usize = 255;

/// An acquired upload destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadLink {
    /// File name the link was issued for
    pub file_name: String,
    /// Destination URL
    pub url: String,
}

/// Upload link acquisition contract
#[async_trait]
pub trait LinkProvider: Send + Sync {
    /// Obtain an upload destination for `file_name`
    async fn create_link(&self, file_name: &str) -> PrismResult<UploadLink>;
}

/// Provider that fabricates links instead of talking to a backend
///
/// Sleeps briefly to mimic a round trip, then issues a URL with a random
/// token. Stands in for the real upload service in demos and tests.
#[derive(Debug, Clone)]
pub struct SimulatedLinkProvider {
    base_url: String,
    delay: Duration,
}

impl SimulatedLinkProvider {
    /// Create a provider issuing links under `base_url`
    pub fn new(base_url: impl Into<String>, delay: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            delay,
        }
    }
}

#[async_trait]
impl LinkProvider for SimulatedLinkProvider {
    async fn create_link(&self, file_name: &str) -> PrismResult<UploadLink> {
        sleep(self.delay).await;
        let token: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        Ok(UploadLink {
            file_name: file_name.to_string(),
            url: format!("{}/{token}/{file_name}", self.base_url),
        })
    }
}

/// Validate a file name against the local shape rules
///
/// Non-empty after trimming, no path separator, at most
/// [`MAX_FILE_NAME_LEN`] characters.
pub fn validate_file_name(name: &str) -> Validation {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Validation {
            is_valid: false,
            error: Some("File name cannot be empty".to_string()),
        };
    }
    if trimmed.contains('/') {
        return Validation {
            is_valid: false,
            error: Some("File name cannot contain slashes".to_string()),
        };
    }
    if trimmed.chars().count() > MAX_FILE_NAME_LEN {
        return Validation {
            is_valid: false,
            error: Some(format!(
                "File name cannot exceed {MAX_FILE_NAME_LEN} characters"
            )),
        };
    }
    Validation {
        is_valid: true,
        error: None,
    }
}

/// Upload link store
///
/// Acquires one link at a time from an injected [`LinkProvider`] under the
/// usual lifecycle. Callers validate the file name with
/// [`validate_file_name`] before loading; an empty name short-circuits to
/// `reset()`.
#[derive(Clone)]
pub struct UploadLinkStore {
    core: StoreCore<UploadLink>,
    provider: Arc<dyn LinkProvider>,
}

impl UploadLinkStore {
    /// Create a store over `provider`
    pub fn new(provider: Arc<dyn LinkProvider>) -> Self {
        Self {
            core: StoreCore::new(),
            provider,
        }
    }

    /// Acquire a link for `file_name`
    pub async fn load(&self, file_name: &str) {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            self.reset();
            return;
        }

        let epoch = self.core.begin_load();
        match self.provider.create_link(file_name).await {
            Ok(link) => {
                self.core.commit(epoch, link);
            }
            Err(err) => {
                self.core.fail(epoch, err.message());
            }
        }
    }

    /// Restore defaults, cancelling any in-flight acquisition
    pub fn reset(&self) {
        self.core.reset();
    }

    /// One consistent read of the store's state
    pub fn snapshot(&self) -> Snapshot<UploadLink> {
        self.core.snapshot()
    }
}
