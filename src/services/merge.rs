//! Reconciles remote entries with the offline cache.
//!
//! Remote wins unconditionally for any date it covers; the cache only fills
//! dates the remote store doesn't have (offline-only writes). Timestamps are
//! not compared.

use crate::models::entry::EntryMap;
use crate::store::StoreError;

pub fn merge_entries(remote: EntryMap, local: EntryMap) -> EntryMap {
    let mut merged = remote;
    for (date, entry) in local {
        merged.entry(date).or_insert(entry);
    }
    merged
}

/// Merged view plus the remote read failure, if there was one.
#[derive(Debug)]
pub struct MergeOutcome {
    pub entries: EntryMap,
    pub remote_error: Option<StoreError>,
}

impl MergeOutcome {
    pub fn is_offline(&self) -> bool {
        self.remote_error.is_some()
    }
}

/// Merge where an unreachable remote counts as an empty one.
pub fn reconcile(remote: Result<EntryMap, StoreError>, local: EntryMap) -> MergeOutcome {
    match remote {
        Ok(remote) => MergeOutcome {
            entries: merge_entries(remote, local),
            remote_error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Remote entries unavailable, showing cached entries only");
            MergeOutcome {
                entries: local,
                remote_error: Some(e),
            }
        }
    }
}
