use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::auth::middleware::CurrentUser;
use crate::dto::PhotoUploadResponse;
use crate::error::{AppError, AppResult};
use crate::store::blob::store_profile_photo;
use crate::AppState;

pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<Value> {
    let mode = if user.0.is_some() { "synced" } else { "local" };
    Json(json!({
        "user": user.0,
        "mode": mode,
    }))
}

/// Upload a profile photo (raw image body) and return its download URL.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<PhotoUploadResponse>> {
    let user_id = user.id().ok_or(AppError::Unauthorized)?;

    let blobs = state
        .blobs
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Photo storage is not configured".into()))?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation("Profile photo must be an image".into()));
    }
    if body.is_empty() {
        return Err(AppError::Validation("Profile photo is empty".into()));
    }

    let photo_url =
        store_profile_photo(blobs, state.config.retry_policy(), user_id, &body, content_type).await?;

    Ok(Json(PhotoUploadResponse { photo_url }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::auth::jwt::issue_token_for_tests;
    use crate::store::memory::MemoryBlobStore;
    use crate::{build_router, AppState};

    const SECRET: &str = "photo-secret";

    fn upload(token: Option<&str>, content_type: &str, bytes: &'static [u8]) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/profile/photo")
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(bytes)).unwrap()
    }

    #[tokio::test]
    async fn test_upload_returns_download_url() {
        let blobs = Arc::new(MemoryBlobStore::default());
        blobs.fail_next_uploads(1);
        let mut state = AppState::for_tests(None, Some(SECRET));
        state.blobs = Some(blobs.clone());
        let token = issue_token_for_tests("user-7", SECRET, 600);

        let response = build_router(state)
            .oneshot(upload(Some(&token), "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["photo_url"]
            .as_str()
            .unwrap()
            .starts_with("memory://profile_photos/user-7/"));
        assert_eq!(blobs.stored_count(), 1);
    }

    #[tokio::test]
    async fn test_upload_requires_sign_in() {
        let mut state = AppState::for_tests(None, Some(SECRET));
        state.blobs = Some(Arc::new(MemoryBlobStore::default()));

        let response = build_router(state)
            .oneshot(upload(None, "image/png", b"\x89PNG"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let mut state = AppState::for_tests(None, Some(SECRET));
        state.blobs = Some(Arc::new(MemoryBlobStore::default()));
        let token = issue_token_for_tests("user-7", SECRET, 600);

        let response = build_router(state)
            .oneshot(upload(Some(&token), "text/plain", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
