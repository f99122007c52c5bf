use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AuthUser, SetPublicKeyRequest};
use crate::AppState;

/// PUT /api/users/me/public-key
///
/// Upload or replace the X25519 public key other users encrypt to. The
/// server never sees any other key material.
pub async fn set_public_key(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SetPublicKeyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let decoded = general_purpose::STANDARD
        .decode(&body.public_key)
        .map_err(|_| ApiError::InvalidInput("Public key must be base64".into()))?;
    if decoded.len() != 32 {
        return Err(ApiError::InvalidInput("Public key must be 32 bytes".into()));
    }

    sqlx::query("UPDATE users SET public_key = ?, updated_at = ? WHERE id = ?")
        .bind(&body.public_key)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users/{userId}/public-key
///
/// `publicKey` is null for a user who never uploaded one; senders fall
/// back to plaintext in that case.
pub async fn get_public_key(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let row = sqlx::query_as::<_, (Option<String>,)>(
        "SELECT public_key FROM users WHERE id = ?",
    )
    .bind(&user_id)
    .fetch_optional(&state.db)
    .await?;

    match row {
        Some((public_key,)) => Ok(Json(serde_json::json!({ "publicKey": public_key }))),
        None => Err(ApiError::NotFound("User not found".into())),
    }
}
