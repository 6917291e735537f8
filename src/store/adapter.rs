use std::sync::Arc;

use chrono::NaiveDate;

use crate::models::entry::{EntryMap, MoodEntry, StoredEntry};
use crate::services::merge::{reconcile, MergeOutcome};
use crate::store::local::LocalCache;
use crate::store::retry::RetryPolicy;
use crate::store::{RemoteStore, StoreError};

/// Front door to both entry sources.
///
/// Remote writes go first; the local mirror is only touched after the remote
/// store accepted the change. Without a signed-in user (or without a remote
/// store configured) the cache is the only source.
pub struct EntryStore {
    remote: Option<Arc<dyn RemoteStore>>,
    local: Arc<LocalCache>,
    retry: RetryPolicy,
}

impl EntryStore {
    pub fn new(remote: Option<Arc<dyn RemoteStore>>, local: Arc<LocalCache>, retry: RetryPolicy) -> Self {
        Self {
            remote,
            local,
            retry,
        }
    }

    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    pub fn remote(&self) -> Option<&dyn RemoteStore> {
        self.remote.as_deref()
    }

    fn remote_for<'a>(&'a self, user_id: Option<&'a str>) -> Option<(&'a dyn RemoteStore, &'a str)> {
        Some((self.remote.as_deref()?, user_id?))
    }

    pub async fn fetch_remote_entries(&self, user_id: &str) -> Result<EntryMap, StoreError> {
        let remote = self
            .remote
            .as_deref()
            .ok_or_else(|| StoreError::RemoteUnavailable("no remote store configured".into()))?;

        let documents = remote.fetch_all(user_id).await?;
        Ok(documents
            .into_iter()
            .map(|(date, stored)| (date, stored.into_entry(date)))
            .collect())
    }

    pub async fn fetch_local_entries(&self) -> Result<EntryMap, StoreError> {
        self.local.entries().await
    }

    /// Merged journal for the current user. Never fails on remote trouble;
    /// that is reported through [`MergeOutcome::remote_error`].
    pub async fn load_merged(&self, user_id: Option<&str>) -> Result<MergeOutcome, StoreError> {
        let local = self.fetch_local_entries().await?;

        let remote = match self.remote_for(user_id) {
            Some((_, user_id)) => self.fetch_remote_entries(user_id).await,
            None => Ok(EntryMap::new()),
        };

        Ok(reconcile(remote, local))
    }

    pub async fn get_entry(
        &self,
        user_id: Option<&str>,
        date: NaiveDate,
    ) -> Result<(Option<MoodEntry>, MergeOutcome), StoreError> {
        let mut merged = self.load_merged(user_id).await?;
        let entry = merged.entries.remove(&date);
        Ok((entry, merged))
    }

    /// Write (or with `None`, delete) the day's entry.
    ///
    /// Idempotent: repeating the same call leaves the same state. When the
    /// remote write fails after its retry the cache is left unchanged.
    pub async fn upsert_entry(
        &self,
        user_id: Option<&str>,
        date: NaiveDate,
        entry: Option<&MoodEntry>,
    ) -> Result<(), StoreError> {
        let stored = entry.map(MoodEntry::to_stored);

        if let Some((remote, user_id)) = self.remote_for(user_id) {
            let stored = stored.as_ref();
            self.retry
                .run("remote_entry_write", move || remote.put(user_id, date, stored))
                .await
                .map_err(|e| match e {
                    StoreError::RemoteWriteFailed(_) => e,
                    other => StoreError::RemoteWriteFailed(other.to_string()),
                })?;

            // Remote is authoritative now; a failed mirror only costs offline coverage.
            if let Err(e) = self.mirror(date, stored).await {
                tracing::warn!(user_id, date = %date, error = %e, "Failed to mirror entry to local cache");
            }
            tracing::info!(user_id, date = %date, deleted = stored.is_none(), "Entry written");
            return Ok(());
        }

        self.mirror(date, stored.as_ref()).await?;
        tracing::info!(date = %date, deleted = stored.is_none(), "Entry written to local cache only");
        Ok(())
    }

    async fn mirror(&self, date: NaiveDate, stored: Option<&StoredEntry>) -> Result<(), StoreError> {
        match stored {
            Some(stored) => self.local.put_entry(date, stored).await,
            None => self.local.remove_entry(date).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood::Mood;
    use crate::store::memory::MemoryRemoteStore;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    const USER: &str = "user-1";

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn fixture() -> (Arc<MemoryRemoteStore>, EntryStore) {
        let remote = Arc::new(MemoryRemoteStore::default());
        let store = EntryStore::new(
            Some(remote.clone() as Arc<dyn RemoteStore>),
            Arc::new(LocalCache::ephemeral()),
            RetryPolicy::new(1, Duration::from_millis(1)),
        );
        (remote, store)
    }

    fn great_day() -> MoodEntry {
        MoodEntry::new(
            day(2024, 3, 15),
            Mood::Happy,
            "great day",
            Utc.with_ymd_and_hms(2024, 3, 15, 21, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_save_fetch_delete_round_trip() {
        let (remote, store) = fixture();
        let entry = great_day();

        store.upsert_entry(Some(USER), entry.date, Some(&entry)).await.unwrap();

        let merged = store.load_merged(Some(USER)).await.unwrap();
        assert_eq!(merged.entries.len(), 1);
        assert_eq!(merged.entries[&entry.date], entry);
        assert_eq!(store.fetch_local_entries().await.unwrap()[&entry.date], entry);

        store.upsert_entry(Some(USER), entry.date, None).await.unwrap();

        assert!(remote.document(USER, entry.date).is_none());
        assert!(store.fetch_local_entries().await.unwrap().is_empty());
        assert!(store.load_merged(Some(USER)).await.unwrap().entries.is_empty());
    }

    #[tokio::test]
    async fn test_resaving_is_idempotent() {
        let (remote, store) = fixture();
        let entry = great_day();

        store.upsert_entry(Some(USER), entry.date, Some(&entry)).await.unwrap();
        store.upsert_entry(Some(USER), entry.date, Some(&entry)).await.unwrap();

        assert_eq!(remote.document(USER, entry.date), Some(entry.to_stored()));
        assert_eq!(store.load_merged(Some(USER)).await.unwrap().entries.len(), 1);
    }

    #[tokio::test]
    async fn test_single_transient_failure_is_retried() {
        let (remote, store) = fixture();
        remote.fail_next_writes(1);
        let entry = great_day();

        store.upsert_entry(Some(USER), entry.date, Some(&entry)).await.unwrap();

        assert_eq!(remote.write_attempts(), 2);
        assert!(remote.document(USER, entry.date).is_some());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_local_untouched() {
        let (remote, store) = fixture();
        let previous = MoodEntry::new(day(2024, 3, 15), Mood::Sad, "before", Utc::now());
        store.upsert_entry(Some(USER), previous.date, Some(&previous)).await.unwrap();

        remote.fail_next_writes(2);
        let result = store
            .upsert_entry(Some(USER), previous.date, Some(&great_day()))
            .await;

        assert!(matches!(result, Err(StoreError::RemoteWriteFailed(_))));
        assert_eq!(store.fetch_local_entries().await.unwrap()[&previous.date], previous);

        remote.fail_next_writes(2);
        let delete = store.upsert_entry(Some(USER), previous.date, None).await;
        assert!(delete.is_err());
        assert!(store.fetch_local_entries().await.unwrap().contains_key(&previous.date));
    }

    #[tokio::test]
    async fn test_unreachable_remote_degrades_to_local() {
        let (remote, store) = fixture();
        let offline = great_day();
        store
            .local()
            .put_entry(offline.date, &offline.to_stored())
            .await
            .unwrap();
        remote.set_unreachable(true);

        let merged = store.load_merged(Some(USER)).await.unwrap();
        assert!(merged.is_offline());
        assert_eq!(merged.entries[&offline.date], offline);
    }

    #[tokio::test]
    async fn test_merge_scenario_remote_wins() {
        let (remote, store) = fixture();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 1, 2, 22, 0, 0).unwrap();

        remote.seed(
            USER,
            day(2024, 1, 1),
            StoredEntry { mood: Mood::Neutral, note: Some(String::new()), timestamp: t1 },
        );
        let local = store.local();
        local
            .put_entry(day(2024, 1, 1), &StoredEntry { mood: Mood::Angry, note: Some("stale".into()), timestamp: t0 })
            .await
            .unwrap();
        local
            .put_entry(day(2024, 1, 2), &StoredEntry { mood: Mood::Tired, note: Some("tired".into()), timestamp: t2 })
            .await
            .unwrap();

        let merged = store.load_merged(Some(USER)).await.unwrap().entries;
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[&day(2024, 1, 1)].mood, Mood::Neutral);
        assert_eq!(merged[&day(2024, 1, 2)].mood, Mood::Tired);
    }

    #[tokio::test]
    async fn test_no_user_is_local_only() {
        let (remote, store) = fixture();
        let entry = great_day();

        store.upsert_entry(None, entry.date, Some(&entry)).await.unwrap();

        assert_eq!(remote.write_attempts(), 0);
        let merged = store.load_merged(None).await.unwrap();
        assert!(!merged.is_offline());
        assert_eq!(merged.entries[&entry.date], entry);
    }

    #[tokio::test]
    async fn test_get_entry_for_selected_day() {
        let (_, store) = fixture();
        let entry = great_day();
        store.upsert_entry(Some(USER), entry.date, Some(&entry)).await.unwrap();

        let (found, _) = store.get_entry(Some(USER), entry.date).await.unwrap();
        assert_eq!(found, Some(entry));

        let (missing, _) = store.get_entry(Some(USER), day(2024, 3, 16)).await.unwrap();
        assert!(missing.is_none());
    }
}
