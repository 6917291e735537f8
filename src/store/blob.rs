use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use uuid::Uuid;

use crate::store::retry::RetryPolicy;
use crate::store::{BlobStore, StoreError};

/// REST client for object storage: `PUT {base}/o/{path}` uploads,
/// `GET {base}/o/{path}` returns metadata with download tokens.
pub struct HttpBlobStore {
    client: Client,
    base: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base: Url, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            api_key,
        })
    }

    fn object_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::BlobUnavailable(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(["o", path]);
        Ok(url)
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8], content_type: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.object_url(path)?)
            .header("x-api-key", &self.api_key)
            .header("content-type", content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| StoreError::BlobUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::BlobUnavailable(format!("upload {status}: {body}")));
        }
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, StoreError> {
        let url = self.object_url(path)?;
        let response = self
            .client
            .get(url.clone())
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::BlobUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(StoreError::BlobUnavailable(format!("metadata {status}")));
        }

        let metadata: ObjectMetadata = response
            .json()
            .await
            .map_err(|e| StoreError::BlobUnavailable(format!("decode metadata: {e}")))?;

        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StoreError::BlobUnavailable(format!("no download token for {path}")))?;

        let mut download = url;
        download
            .query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(download.to_string())
    }
}

/// Unique storage path for a user's profile photo.
pub fn profile_photo_path(user_id: &str) -> String {
    format!("profile_photos/{}/{}", user_id, Uuid::new_v4())
}

/// Store the photo, then resolve its download reference. Each of the two
/// network calls gets the retry policy on its own.
pub async fn store_profile_photo(
    blobs: &dyn BlobStore,
    retry: RetryPolicy,
    user_id: &str,
    bytes: &[u8],
    content_type: &str,
) -> Result<String, StoreError> {
    let path = profile_photo_path(user_id);
    let path = path.as_str();

    retry
        .run("blob_upload", move || blobs.upload(path, bytes, content_type))
        .await?;
    let url = retry
        .run("blob_download_url", move || blobs.download_url(path))
        .await?;

    tracing::info!(user_id, path, "Profile photo stored");
    Ok(url)
}
