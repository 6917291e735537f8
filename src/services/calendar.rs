use chrono::{Datelike, Months, NaiveDate};

use crate::models::entry::EntryMap;
use crate::models::view::{DayTile, MonthGrid, YearMonth};

/// Month grid for the day picker. `None` when `year`/`month` is not a real month.
pub fn month_grid(year: i32, month: u32, today: NaiveDate, entries: &EntryMap) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = first.checked_add_months(Months::new(1))?;
    let prev_first = first.checked_sub_months(Months::new(1))?;

    let days = first
        .iter_days()
        .take_while(|date| *date < next_first)
        .map(|date| {
            let mood = entries.get(&date).map(|entry| entry.mood.clone());
            DayTile {
                date,
                day: date.day(),
                is_today: date == today,
                color: mood.as_ref().map(|m| m.color()),
                mood,
            }
        })
        .collect();

    Some(MonthGrid {
        title: first.format("%B %Y").to_string(),
        year,
        month,
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
        prev: YearMonth {
            year: prev_first.year(),
            month: prev_first.month(),
        },
        next: YearMonth {
            year: next_first.year(),
            month: next_first.month(),
        },
    })
}
