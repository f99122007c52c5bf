use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AuthUser, UpdateUserRequest, UserProfile};
use crate::AppState;

#[derive(Deserialize)]
pub struct UserSearchQuery {
    pub q: Option<String>,
}

/// GET /api/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = fetch_profile(&state, &user.id).await?;
    Ok(Json(profile))
}

/// PATCH /api/users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let now = chrono::Utc::now().to_rfc3339();

    if let Some(username) = &body.username {
        let username = username.trim();
        ripple_shared::validation::validate_username(username).map_err(ApiError::InvalidInput)?;

        let taken = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE username = ? AND id != ?",
        )
        .bind(username)
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;
        if taken > 0 {
            return Err(ApiError::Conflict("Username already taken".into()));
        }

        sqlx::query("UPDATE users SET username = ?, updated_at = ? WHERE id = ?")
            .bind(username)
            .bind(&now)
            .bind(&user.id)
            .execute(&state.db)
            .await?;
    }

    // image: absent = unchanged, null = cleared, string = replaced
    if let Some(image) = &body.image {
        let image = match image {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            _ => {
                return Err(ApiError::InvalidInput(
                    "image must be a string or null".into(),
                ))
            }
        };

        sqlx::query("UPDATE users SET image = ?, updated_at = ? WHERE id = ?")
            .bind(image)
            .bind(&now)
            .bind(&user.id)
            .execute(&state.db)
            .await?;
    }

    let profile = fetch_profile(&state, &user.id).await?;
    Ok(Json(profile))
}

/// GET /api/users/search?q=
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<UserSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let q = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => q.trim().to_string(),
        _ => return Ok(Json(Vec::<serde_json::Value>::new())),
    };

    let pattern = format!("%{}%", q);
    let results = sqlx::query_as::<_, (String, String, Option<String>)>(
        "SELECT id, username, image FROM users WHERE username LIKE ? LIMIT 10",
    )
    .bind(&pattern)
    .fetch_all(&state.db)
    .await?;

    let items: Vec<serde_json::Value> = results
        .into_iter()
        .map(|(id, username, image)| {
            serde_json::json!({"id": id, "username": username, "image": image})
        })
        .collect();

    Ok(Json(items))
}

async fn fetch_profile(state: &AppState, user_id: &str) -> Result<UserProfile, ApiError> {
    sqlx::query_as::<_, UserProfile>(
        "SELECT id, username, email, image, public_key FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}
