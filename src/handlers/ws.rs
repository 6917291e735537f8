use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::jwt::verify_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Tell open views that the journal changed so they re-render.
pub fn notify_entries_changed(state: &AppState, user_id: Option<&str>, date: NaiveDate, action: &str) {
    if let Some(tx) = state.ws_tx.as_ref() {
        let msg = serde_json::json!({
            "type": "entries_changed",
            "user_id": user_id,
            "date": date,
            "action": action,
        });
        // No subscribers is fine
        let _ = tx.send(msg.to_string());
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    let user_id = match authenticate_ws(&state, query.token.as_deref()) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("WebSocket auth failed: {}", e);
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

/// No token: anonymous subscriber that only sees local-only changes.
fn authenticate_ws(state: &AppState, token: Option<&str>) -> Result<Option<String>, &'static str> {
    let Some(token) = token else {
        return Ok(None);
    };
    let secret = state
        .config
        .auth_secret
        .as_deref()
        .ok_or("Sign-in is not configured")?;

    let token_data = verify_token(token, secret).map_err(|_| "Invalid or expired token")?;
    Ok(Some(token_data.claims.sub))
}

fn is_for_subscriber(msg: &str, subscriber: Option<&str>) -> bool {
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(msg) else {
        return false;
    };
    parsed.get("user_id").and_then(|v| v.as_str()) == subscriber
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Option<String>) {
    let (mut sender, mut receiver) = socket.split();

    let Some(mut rx) = state.ws_tx.as_ref().map(|tx| tx.subscribe()) else {
        tracing::warn!("WebSocket broadcast channel not initialized");
        return;
    };

    tracing::debug!(user_id = ?user_id, "WebSocket connection established");

    let subscriber = user_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if !is_for_subscriber(&msg, subscriber.as_deref()) {
                continue;
            }
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(user_id = ?user_id, "WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notifications_are_scoped_to_the_user() {
        let state = AppState::for_tests(None, None);
        let mut rx = state.ws_tx.as_ref().unwrap().subscribe();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        notify_entries_changed(&state, Some("user-1"), date, "saved");
        let msg = rx.recv().await.unwrap();

        assert!(is_for_subscriber(&msg, Some("user-1")));
        assert!(!is_for_subscriber(&msg, Some("user-2")));
        assert!(!is_for_subscriber(&msg, None));
    }

    #[tokio::test]
    async fn test_local_only_changes_reach_anonymous_subscribers() {
        let state = AppState::for_tests(None, None);
        let mut rx = state.ws_tx.as_ref().unwrap().subscribe();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();

        notify_entries_changed(&state, None, date, "deleted");
        let msg = rx.recv().await.unwrap();

        assert!(is_for_subscriber(&msg, None));
        assert!(msg.contains("\"action\":\"deleted\""));
    }

    #[test]
    fn test_missing_token_is_anonymous() {
        let state = AppState::for_tests(None, None);
        assert_eq!(authenticate_ws(&state, None), Ok(None));
        assert!(authenticate_ws(&state, Some("token")).is_err());
    }
}
