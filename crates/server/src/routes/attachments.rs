use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{Attachment, AuthUser, CreateAttachmentRequest};
use crate::AppState;

/// POST /api/attachments
///
/// Registers an attachment descriptor owned by the uploader. It stays
/// unlinked until a send claims it via `attachmentIds`.
pub async fn create_attachment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<CreateAttachmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.filename.trim().is_empty() {
        return Err(ApiError::InvalidInput("Filename is required".into()));
    }
    if body.content_type.trim().is_empty() {
        return Err(ApiError::InvalidInput("Content type is required".into()));
    }
    if body.size <= 0 {
        return Err(ApiError::InvalidInput(
            "Attachment size must be positive".into(),
        ));
    }

    let attachment = Attachment {
        id: uuid::Uuid::new_v4().to_string(),
        message_id: None,
        uploader_id: user.id.clone(),
        filename: body.filename.trim().to_string(),
        content_type: body.content_type.trim().to_string(),
        size: body.size,
        storage_key: nanoid::nanoid!(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO attachments (id, message_id, uploader_id, filename, content_type, size, storage_key, created_at) \
         VALUES (?, NULL, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&attachment.id)
    .bind(&attachment.uploader_id)
    .bind(&attachment.filename)
    .bind(&attachment.content_type)
    .bind(attachment.size)
    .bind(&attachment.storage_key)
    .bind(&attachment.created_at)
    .execute(&state.db)
    .await?;

    Ok(Json(attachment))
}
