use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "moodboard",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let cache_ok = state.entries.local().is_available().await;

    let remote = match state.entries.remote() {
        Some(remote) => match remote.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Remote store not reachable");
                "unreachable"
            }
        },
        None => "not_configured",
    };

    // An unreachable remote only degrades the journal to offline mode.
    if cache_ok {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": { "local_cache": "ok", "remote_store": remote },
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "checks": { "local_cache": "failed", "remote_store": remote },
            })),
        )
    }
}
