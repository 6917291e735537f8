use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::mood::Mood;

/// Journal entries keyed by day. At most one entry per date.
pub type EntryMap = BTreeMap<NaiveDate, MoodEntry>;

/// One day's journal entry as exposed past the merge step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodEntry {
    pub date: NaiveDate,
    pub mood: Mood,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

impl MoodEntry {
    pub fn new(date: NaiveDate, mood: Mood, note: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            date,
            mood,
            note: note.into(),
            timestamp,
        }
    }

    pub fn to_stored(&self) -> StoredEntry {
        StoredEntry {
            mood: self.mood.clone(),
            note: Some(self.note.clone()),
            timestamp: self.timestamp,
        }
    }
}

/// Document shape shared by the remote store and the local cache:
/// `{mood, note, timestamp}` with the date carried by the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub mood: Mood,
    #[serde(default)]
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StoredEntry {
    /// Attach the key date; a missing or null note becomes `""`.
    pub fn into_entry(self, date: NaiveDate) -> MoodEntry {
        MoodEntry {
            date,
            mood: self.mood,
            note: self.note.unwrap_or_default(),
            timestamp: self.timestamp,
        }
    }
}

/// Parse a storage key of the exact form `YYYY-MM-DD`.
///
/// Returns `None` for keys that don't have that shape (session state shares
/// the cache) and for shaped keys that aren't a real calendar day.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let bytes = key.as_bytes();
    if bytes.len() != 10 {
        return None;
    }
    let shaped = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
