use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::auth::middleware::CurrentUser;
use crate::dto::{CalendarQuery, HistoryQuery};
use crate::error::{AppError, AppResult};
use crate::models::mood::Mood;
use crate::models::view::{HistoryView, MonthGrid};
use crate::services::calendar::month_grid;
use crate::services::filter::EntryFilter;
use crate::services::view::render_history;
use crate::AppState;

/// History screen: filtered entry cards plus the trailing-year heat-map.
pub async fn get_history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryView>> {
    let merged = state.entries.load_merged(user.id()).await?;

    let filter = EntryFilter::new(query.mood_filter(), query.search.clone().unwrap_or_default());
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());

    let view = render_history(&merged, &filter, today);
    tracing::debug!(
        entries = merged.entries.len(),
        shown = view.entries.len(),
        offline = view.offline,
        "History rendered"
    );

    Ok(Json(view))
}

/// Month grid for the day picker. Defaults to the current month.
pub async fn get_calendar(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<MonthGrid>> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let merged = state.entries.load_merged(user.id()).await?;

    month_grid(year, month, today, &merged.entries)
        .map(Json)
        .ok_or_else(|| AppError::Validation(format!("Invalid month: {year}-{month}")))
}

#[derive(Debug, Serialize)]
pub struct MoodOption {
    pub mood: Mood,
    pub color: &'static str,
    pub intensity: u8,
}

/// The mood palette offered in the day dialog and the history filter.
pub async fn list_moods() -> Json<Vec<MoodOption>> {
    Json(
        Mood::KNOWN
            .into_iter()
            .map(|mood| MoodOption {
                color: mood.color(),
                intensity: mood.intensity(),
                mood,
            })
            .collect(),
    )
}
