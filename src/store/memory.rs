//! In-process stand-ins for the hosted services, with failure injection.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::entry::StoredEntry;
use crate::store::{BlobStore, RemoteDocuments, RemoteStore, StoreError};

fn take_failure(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[derive(Default)]
pub struct MemoryRemoteStore {
    users: Mutex<HashMap<String, RemoteDocuments>>,
    unreachable: AtomicBool,
    failing_writes: AtomicU32,
    writes: AtomicU32,
}

impl MemoryRemoteStore {
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make the next `n` writes fail.
    pub fn fail_next_writes(&self, n: u32) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    pub fn seed(&self, user_id: &str, date: NaiveDate, entry: StoredEntry) {
        self.users
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .insert(date, entry);
    }

    pub fn document(&self, user_id: &str, date: NaiveDate) -> Option<StoredEntry> {
        self.users
            .lock()
            .unwrap()
            .get(user_id)
            .and_then(|docs| docs.get(&date).cloned())
    }

    /// Write attempts seen so far, failed ones included.
    pub fn write_attempts(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch_all(&self, user_id: &str) -> Result<RemoteDocuments, StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteUnavailable("connection refused".into()));
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put(
        &self,
        user_id: &str,
        date: NaiveDate,
        entry: Option<&StoredEntry>,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) || take_failure(&self.failing_writes) {
            return Err(StoreError::RemoteWriteFailed("503 Service Unavailable".into()));
        }

        let mut users = self.users.lock().unwrap();
        let docs = users.entry(user_id.to_string()).or_default();
        match entry {
            Some(entry) => {
                docs.insert(date, entry.clone());
            }
            None => {
                docs.remove(&date);
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::RemoteUnavailable("connection refused".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    failing_uploads: AtomicU32,
    failing_lookups: AtomicU32,
}

impl MemoryBlobStore {
    pub fn fail_next_uploads(&self, n: u32) {
        self.failing_uploads.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_lookups(&self, n: u32) {
        self.failing_lookups.store(n, Ordering::SeqCst);
    }

    pub fn stored_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<(), StoreError> {
        if take_failure(&self.failing_uploads) {
            return Err(StoreError::BlobUnavailable("upload timed out".into()));
        }
        self.blobs
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, StoreError> {
        if take_failure(&self.failing_lookups) {
            return Err(StoreError::BlobUnavailable("metadata timed out".into()));
        }
        if self.blobs.lock().unwrap().contains_key(path) {
            Ok(format!("memory://{path}"))
        } else {
            Err(StoreError::BlobUnavailable(format!("no object at {path}")))
        }
    }
}
