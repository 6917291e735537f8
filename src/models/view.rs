use chrono::NaiveDate;
use serde::Serialize;

use super::mood::Mood;

/// One day of the trailing-year heat-map. Recomputed on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub intensity: u8,
    pub tooltip: String,
}

/// An entry as shown in the history list.
#[derive(Debug, Clone, Serialize)]
pub struct EntryCard {
    pub date: NaiveDate,
    pub formatted_date: String,
    pub time: String,
    pub mood: Mood,
    pub color: &'static str,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub entries: Vec<EntryCard>,
    pub heatmap: Vec<HeatmapCell>,
    /// True when the remote store could not be read and only cached entries are shown.
    pub offline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayTile {
    pub date: NaiveDate,
    pub day: u32,
    pub is_today: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub title: String,
    pub year: i32,
    pub month: u32,
    /// Blank tiles before the 1st, Sunday-first week.
    pub leading_blanks: u32,
    pub days: Vec<DayTile>,
    pub prev: YearMonth,
    pub next: YearMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}
