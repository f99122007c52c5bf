use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use ripple_shared::constants::MESSAGE_PAGE_SIZE;
use ripple_shared::ThreadId;

use crate::error::ApiError;
use crate::models::{AuthUser, MarkReadRequest};
use crate::AppState;

use super::{ensure_user_exists, MessageQuery};

/// GET /api/dms/{userId}/messages
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &user_id).await?;
    let thread = ThreadId::derive(&user.id, &user_id)?;

    let limit = query.limit.unwrap_or(MESSAGE_PAGE_SIZE);
    let page = state
        .store
        .list(&thread, query.cursor.as_deref(), limit)
        .await?;

    Ok(Json(page))
}

/// POST /api/dms/{userId}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(user_id): Path<String>,
    Json(body): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_user_exists(&state, &user_id).await?;
    let thread = ThreadId::derive(&user.id, &user_id)?;

    let at = body.at;
    let last_read_at = state.store.mark_read(&thread, &user.id, at).await?;
    let unread_count = state.store.unread_count(&thread, &user.id).await?;

    Ok(Json(serde_json::json!({
        "threadId": thread.as_str(),
        "lastReadAt": last_read_at,
        "unreadCount": unread_count,
    })))
}
