use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::AuthUser;
use crate::AppState;

pub const SESSION_COOKIE: &str = "ripple.session_token";

/// Pull the session token from `Authorization: Bearer` or the session cookie.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    let cookie_header = headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let prefix = format!("{}=", SESSION_COOKIE);
    cookie_header
        .split(';')
        .filter_map(|c| {
            let c = c.trim();
            c.strip_prefix(prefix.as_str())
                .filter(|t| !t.is_empty())
                .map(|t| t.to_string())
        })
        .next()
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = match extract_token(&parts.headers) {
            Some(t) => t,
            None => return Err(ApiError::Unauthorized.into_response()),
        };

        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT u.id, u.username, s.expires_at
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token = ?",
        )
        .bind(&token)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()).into_response())?;

        let (user_id, username, expires_at) = match row {
            Some(r) => r,
            None => return Err(ApiError::Unauthorized.into_response()),
        };

        let now = chrono::Utc::now().to_rfc3339();
        if expires_at < now {
            return Err(ApiError::Unauthorized.into_response());
        }

        Ok(AuthUser {
            id: user_id,
            username,
        })
    }
}
