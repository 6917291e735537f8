//! # Moodboard — Request/Response DTOs
//!
//! API contract types for the journal's HTTP surface.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::entry::MoodEntry;
use crate::models::mood::Mood;

// ============================================================================
// Common
// ============================================================================

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub date: NaiveDate,
}

// ============================================================================
// Entries
// ============================================================================

/// PUT /api/entries/:date
#[derive(Debug, Deserialize, Validate)]
pub struct SaveEntryRequest {
    /// Mood symbol picked in the day dialog. Missing = nothing selected.
    #[validate(length(min = 1, max = 32, message = "Please select a mood and a date."))]
    #[serde(default)]
    pub mood: String,

    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    #[serde(default)]
    pub note: Option<String>,
}

/// PATCH /api/entries/:date
#[derive(Debug, Deserialize, Validate)]
pub struct EditNoteRequest {
    #[validate(length(max = 5000, message = "Note must be at most 5000 characters"))]
    pub note: String,
}

/// GET /api/entries/:date
#[derive(Debug, Serialize)]
pub struct DayEntryResponse {
    pub date: NaiveDate,
    pub entry: Option<MoodEntry>,
    pub offline: bool,
}

// ============================================================================
// History & calendar
// ============================================================================

/// GET /api/history
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Mood symbol; empty means no mood filter.
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    /// Reference day for the heat-map window. Defaults to today (UTC).
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl HistoryQuery {
    pub fn mood_filter(&self) -> Option<Mood> {
        self.mood
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(Mood::parse)
    }
}

/// GET /api/calendar
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

// ============================================================================
// Profile
// ============================================================================

/// POST /api/profile/photo
#[derive(Debug, Serialize)]
pub struct PhotoUploadResponse {
    pub photo_url: String,
}
