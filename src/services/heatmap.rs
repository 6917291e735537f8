use chrono::{Datelike, NaiveDate};

use crate::models::entry::EntryMap;
use crate::models::view::HeatmapCell;

/// First day of the trailing-year window ending on `today`.
///
/// Feb 29 rolls over to Mar 1 of the previous year. Dates within a year of
/// the calendar's lower bound clamp to that bound.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    let year = today.year() - 1;
    today
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(NaiveDate::MIN)
}

/// `3/15/2024` style date used in tooltips.
pub fn short_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// One cell per day from a year ago through `today`, oldest first.
pub fn build_heatmap(entries: &EntryMap, today: NaiveDate) -> Vec<HeatmapCell> {
    window_start(today)
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| match entries.get(&date) {
            Some(entry) => HeatmapCell {
                date,
                intensity: entry.mood.intensity(),
                tooltip: format!("{}\n{} {}", short_date(date), entry.mood, entry.note)
                    .trim_end()
                    .to_string(),
            },
            None => HeatmapCell {
                date,
                intensity: 0,
                tooltip: format!("No mood recorded for {}", short_date(date)),
            },
        })
        .collect()
}
