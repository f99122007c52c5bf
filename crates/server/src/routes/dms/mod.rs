mod messages;

pub use messages::*;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use ripple_shared::ThreadId;

use crate::error::ApiError;
use crate::models::{AuthUser, SendMessageRequest};
use crate::AppState;

#[derive(Deserialize)]
pub struct MessageQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/dms
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let conversations = state.store.list_conversations(&user.id).await?;
    Ok(Json(conversations))
}

/// POST /api/dms/{userId}/messages
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &user_id).await?;
    let thread = ThreadId::derive(&user.id, &user_id)?;

    // Capacity check happens before the ledger is touched
    if !state.limiter.check(&user.id).await {
        return Err(ApiError::RateLimited);
    }

    let message = state
        .store
        .append(
            &thread,
            &user.id,
            &body.body,
            &body.attachment_ids,
            body.reply_to_id.as_deref(),
        )
        .await?;

    Ok(Json(message))
}

pub(super) async fn ensure_user_exists(state: &AppState, user_id: &str) -> Result<(), ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_one(&state.db)
        .await?;
    if exists == 0 {
        return Err(ApiError::NotFound("User not found".into()));
    }
    Ok(())
}
