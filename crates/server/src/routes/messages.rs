use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{AuthUser, EditMessageRequest, ToggleReactionRequest};
use crate::AppState;

#[derive(Deserialize)]
pub struct ReactionQuery {
    pub ids: Option<String>,
}

/// PATCH /api/messages/{messageId}
pub async fn edit_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<String>,
    Json(body): Json<EditMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.store.edit(&message_id, &user.id, &body.body).await?;
    Ok(Json(message))
}

/// DELETE /api/messages/{messageId}
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete(&message_id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/messages/{messageId}/reactions
pub async fn toggle_reaction(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(message_id): Path<String>,
    Json(body): Json<ToggleReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reactions = state
        .store
        .toggle_reaction(&message_id, &user.id, &body.emoji)
        .await?;

    Ok(Json(serde_json::json!({
        "messageId": message_id,
        "reactions": reactions,
    })))
}

/// GET /api/messages/reactions?ids=a,b,c
pub async fn get_reactions(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ReactionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ids: Vec<String> = query
        .ids
        .as_deref()
        .unwrap_or("")
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    let map = state.store.reactions_for_messages(&ids).await?;
    Ok(Json(map))
}
