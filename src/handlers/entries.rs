use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use validator::Validate;

use crate::auth::middleware::CurrentUser;
use crate::dto::{DayEntryResponse, DeleteResponse, EditNoteRequest, SaveEntryRequest};
use crate::error::{AppError, AppResult};
use crate::handlers::ws::notify_entries_changed;
use crate::models::entry::MoodEntry;
use crate::models::mood::Mood;
use crate::AppState;

/// Day selection: the existing entry for the day, to prefill the dialog.
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<DayEntryResponse>> {
    let (entry, merged) = state.entries.get_entry(user.id(), date).await?;

    Ok(Json(DayEntryResponse {
        date,
        entry,
        offline: merged.is_offline(),
    }))
}

/// Save the mood (and note) for a day, creating or replacing its entry.
pub async fn save_entry(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<SaveEntryRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()?;

    let mood = Mood::parse(&body.mood);
    if !mood.is_known() {
        tracing::debug!(mood = %mood, date = %date, "Saving entry with unrecognized mood");
    }

    let entry = MoodEntry::new(date, mood, body.note.unwrap_or_default(), Utc::now());
    state
        .entries
        .upsert_entry(user.id(), date, Some(&entry))
        .await?;

    notify_entries_changed(&state, user.id(), date, "saved");
    Ok(Json(entry))
}

/// Replace the note of an existing entry, refreshing its timestamp.
pub async fn edit_note(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<EditNoteRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()?;

    let (existing, _) = state.entries.get_entry(user.id(), date).await?;
    let existing = existing.ok_or_else(|| AppError::NotFound(format!("No entry for {date}")))?;

    let entry = MoodEntry {
        note: body.note,
        timestamp: Utc::now(),
        ..existing
    };
    state
        .entries
        .upsert_entry(user.id(), date, Some(&entry))
        .await?;

    notify_entries_changed(&state, user.id(), date, "edited");
    Ok(Json(entry))
}

/// Delete the day's entry from both stores. Deleting twice is fine.
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<DeleteResponse>> {
    state.entries.upsert_entry(user.id(), date, None).await?;

    notify_entries_changed(&state, user.id(), date, "deleted");
    Ok(Json(DeleteResponse {
        deleted: true,
        date,
    }))
}
