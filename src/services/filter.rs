use crate::models::entry::{EntryMap, MoodEntry};
use crate::models::mood::Mood;

/// History filters: exact mood match and case-insensitive note search.
/// An unset mood and empty search match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub mood: Option<Mood>,
    pub search: String,
}

impl EntryFilter {
    pub fn new(mood: Option<Mood>, search: impl Into<String>) -> Self {
        Self {
            mood,
            search: search.into(),
        }
    }

    pub fn matches(&self, entry: &MoodEntry) -> bool {
        let matches_mood = self.mood.as_ref().map_or(true, |mood| entry.mood == *mood);
        let matches_search = self.search.is_empty()
            || entry
                .note
                .to_lowercase()
                .contains(&self.search.to_lowercase());
        matches_mood && matches_search
    }
}

/// Entries passing the filter, newest date first.
pub fn filter_and_sort(entries: &EntryMap, filter: &EntryFilter) -> Vec<MoodEntry> {
    let mut matched: Vec<MoodEntry> = entries
        .values()
        .filter(|entry| filter.matches(entry))
        .cloned()
        .collect();

    matched.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.timestamp.cmp(&a.timestamp))
    });
    matched
}
