//! Projection of the merged journal into what the history screen draws.

use chrono::NaiveDate;

use crate::models::entry::MoodEntry;
use crate::models::view::{EntryCard, HistoryView};
use crate::services::filter::{filter_and_sort, EntryFilter};
use crate::services::heatmap::build_heatmap;
use crate::services::merge::MergeOutcome;

const OFFLINE_NOTICE: &str = "Showing entries saved on this device. Changes from other devices will appear once you're back online.";

impl From<&MoodEntry> for EntryCard {
    fn from(entry: &MoodEntry) -> Self {
        Self {
            date: entry.date,
            formatted_date: entry.date.format("%A, %B %-d, %Y").to_string(),
            time: entry.timestamp.format("%-I:%M:%S %p").to_string(),
            mood: entry.mood.clone(),
            color: entry.mood.color(),
            note: if entry.note.is_empty() {
                "No note".to_string()
            } else {
                entry.note.clone()
            },
        }
    }
}

pub fn render_history(merged: &MergeOutcome, filter: &EntryFilter, today: NaiveDate) -> HistoryView {
    let entries = filter_and_sort(&merged.entries, filter)
        .iter()
        .map(EntryCard::from)
        .collect();

    HistoryView {
        entries,
        // The heat-map always shows the whole journal, not the filtered subset.
        heatmap: build_heatmap(&merged.entries, today),
        offline: merged.is_offline(),
        notice: merged.is_offline().then(|| OFFLINE_NOTICE.to_string()),
    }
}
