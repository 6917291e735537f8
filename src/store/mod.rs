//! Storage seams: the hosted entry store, the local offline cache, blob
//! storage, and the adapter that keeps remote and local in step.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::entry::StoredEntry;

pub mod adapter;
pub mod blob;
pub mod local;
pub mod remote;
pub mod retry;

#[cfg(test)]
pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Remote write failed: {0}")]
    RemoteWriteFailed(String),

    #[error("Malformed local entry {key}: {reason}")]
    MalformedLocalEntry { key: String, reason: String },

    #[error("Local cache error: {0}")]
    LocalCache(String),

    #[error("Blob storage unavailable: {0}")]
    BlobUnavailable(String),
}

/// Documents read from the remote store, already keyed by day.
pub type RemoteDocuments = BTreeMap<NaiveDate, StoredEntry>;

/// Per-user document store, one document per `(user, date)`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every document under the user's namespace.
    async fn fetch_all(&self, user_id: &str) -> Result<RemoteDocuments, StoreError>;

    /// Write the day's document; `None` deletes it.
    async fn put(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: Option<&StoredEntry>,
    ) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Byte storage for profile photos.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError>;

    /// Resolve a URL the browser can fetch the blob from.
    async fn download_url(&self, path: &str) -> Result<String, StoreError>;
}
