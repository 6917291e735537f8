use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};

use crate::models::entry::{date_key, parse_date_key, StoredEntry};
use crate::store::{RemoteDocuments, RemoteStore, StoreError};

/// REST client for the hosted entry store.
///
/// Layout: `GET {base}/users/{uid}/moods` returns an object of
/// `date -> {mood, note, timestamp}`; `PUT` / `DELETE` on
/// `{base}/users/{uid}/moods/{date}` write or remove one day.
pub struct HttpRemoteStore {
    client: Client,
    base: Url,
    api_key: String,
}

impl HttpRemoteStore {
    pub fn new(base: Url, api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            api_key,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, String> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be a base URL", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_all(&self, user_id: &str) -> Result<RemoteDocuments, StoreError> {
        let url = self
            .url(&["users", user_id, "moods"])
            .map_err(StoreError::RemoteUnavailable)?;

        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::RemoteUnavailable(format!("{status}: {body}")));
        }

        let raw: HashMap<String, serde_json::Value> = response
            .json()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(format!("decode documents: {e}")))?;

        let mut documents = RemoteDocuments::new();
        for (key, value) in raw {
            let Some(date) = parse_date_key(&key) else {
                tracing::warn!(user_id, key = %key, "Ignoring remote document with non-date id");
                continue;
            };
            match serde_json::from_value::<StoredEntry>(value) {
                Ok(entry) => {
                    documents.insert(date, entry);
                }
                Err(e) => {
                    tracing::warn!(user_id, date = %date, error = %e, "Ignoring malformed remote document");
                }
            }
        }

        Ok(documents)
    }

    async fn put(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: Option<&StoredEntry>,
    ) -> Result<(), StoreError> {
        let key = date_key(date);
        let url = self
            .url(&["users", user_id, "moods", &key])
            .map_err(StoreError::RemoteWriteFailed)?;

        let request = match entry {
            Some(entry) => self.client.put(url).json(entry),
            None => self.client.delete(url),
        };

        let response = request
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::RemoteWriteFailed(e.to_string()))?;

        let status = response.status();
        // Deleting a document that is already gone is a success.
        if status.is_success() || (entry.is_none() && status == StatusCode::NOT_FOUND) {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::RemoteWriteFailed(format!("{status}: {body}")))
    }

    /// Reachable means answering without a server error. The base URL
    /// itself need not be a resource, so 4xx still counts.
    async fn ping(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .head(self.base.clone())
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(StoreError::RemoteUnavailable(format!("health probe returned {status}")));
        }
        Ok(())
    }
}
