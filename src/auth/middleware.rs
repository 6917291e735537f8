use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone, serde::Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// The signed-in user, if any. `None` means the journal runs local-only.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthUser>);

impl CurrentUser {
    pub fn id(&self) -> Option<&str> {
        self.0.as_ref().map(|user| user.id.as_str())
    }
}

/// Resolve the optional current user from the bearer token.
///
/// No `Authorization` header: anonymous, local-only. A header that doesn't
/// verify is rejected rather than silently downgraded.
pub async fn resolve_user(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(auth_header) = req.headers().get(AUTHORIZATION) else {
        req.extensions_mut().insert(CurrentUser::default());
        return Ok(next.run(req).await);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let secret = state
        .config
        .auth_secret
        .as_deref()
        .ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(token, secret)?;

    let user = AuthUser {
        id: token_data.claims.sub,
        email: token_data.claims.email.filter(|e| !e.is_empty()),
        name: token_data.claims.name.filter(|n| !n.is_empty()),
    };

    tracing::debug!(user_id = %user.id, "Request authenticated");
    req.extensions_mut().insert(CurrentUser(Some(user)));
    Ok(next.run(req).await)
}
