//! File-backed key/value cache used as the offline mirror of the journal.
//!
//! Keys are plain strings. Journal entries live under `YYYY-MM-DD` keys with a
//! JSON-encoded `{mood, note, timestamp}` value; other keys hold unrelated
//! session state and are left alone by entry scans.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::models::entry::{date_key, parse_date_key, EntryMap, StoredEntry};
use crate::store::StoreError;

type Values = BTreeMap<String, String>;

pub struct LocalCache {
    path: Option<PathBuf>,
    values: Mutex<Values>,
}

impl LocalCache {
    /// Open the cache file, starting empty when it doesn't exist yet.
    ///
    /// An unreadable or corrupt file is treated as an empty cache: the cache
    /// only mirrors the remote store, so losing it is not fatal.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Values>(&bytes) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Local cache is corrupt, starting empty");
                    Values::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Values::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Local cache unreadable, starting empty");
                Values::new()
            }
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Local cache opened");

        Self {
            path: Some(path),
            values: Mutex::new(values),
        }
    }

    /// A cache that never touches disk.
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            values: Mutex::new(Values::new()),
        }
    }

    #[cfg(test)]
    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.update(|values| {
            values.insert(key.to_string(), value);
            true
        })
        .await
    }

    pub async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|values| values.remove(key).is_some()).await
    }

    /// Every parseable entry under a date key. Malformed values are skipped.
    pub async fn entries(&self) -> Result<EntryMap, StoreError> {
        let values = self.values.lock().await;
        let mut entries = EntryMap::new();

        for (key, raw) in values.iter() {
            let Some(date) = parse_date_key(key) else {
                continue;
            };
            match decode_entry(key, raw) {
                Ok(stored) => {
                    entries.insert(date, stored.into_entry(date));
                }
                Err(e) => tracing::debug!(error = %e, "Skipping cached entry"),
            }
        }

        Ok(entries)
    }

    pub async fn put_entry(&self, date: NaiveDate, entry: &StoredEntry) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(entry)
            .map_err(|e| StoreError::LocalCache(format!("encode entry: {e}")))?;
        self.set(&date_key(date), encoded).await
    }

    pub async fn remove_entry(&self, date: NaiveDate) -> Result<(), StoreError> {
        self.remove(&date_key(date)).await
    }

    /// Readiness probe: the directory holding the cache file exists.
    pub async fn is_available(&self) -> bool {
        match self.path.as_deref().map(cache_dir) {
            Some(dir) => tokio::fs::metadata(dir)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false),
            None => true,
        }
    }

    /// Apply `change` to a copy of the values and swap it in once it is on
    /// disk. `change` returns false when it left the values untouched.
    async fn update(&self, change: impl FnOnce(&mut Values) -> bool) -> Result<(), StoreError> {
        let mut values = self.values.lock().await;
        let mut next = values.clone();
        if !change(&mut next) {
            return Ok(());
        }

        self.persist(&next).await?;
        *values = next;
        Ok(())
    }

    async fn persist(&self, values: &Values) -> Result<(), StoreError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|e| StoreError::LocalCache(format!("encode cache: {e}")))?;

        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| StoreError::LocalCache(format!("cache writer: {e}")))?
    }
}

fn cache_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Write to a temp file next to `path`, then rename it over `path`.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let failed = |e: std::io::Error| StoreError::LocalCache(format!("write {}: {e}", path.display()));

    let mut file = NamedTempFile::new_in(cache_dir(path)).map_err(failed)?;
    file.write_all(bytes).map_err(failed)?;
    file.persist(path).map_err(|e| failed(e.error))?;
    Ok(())
}

fn decode_entry(key: &str, raw: &str) -> Result<StoredEntry, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::MalformedLocalEntry {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
