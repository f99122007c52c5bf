use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use ripple_shared::Body;

use crate::models::OtherUser;

/// Per-message reactions: emoji to the users who reacted with it, in
/// first-reaction order.
pub type ReactionMap = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    pub body: Body,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    /// Milliseconds since epoch; drives ordering and unread comparison.
    pub created_at: i64,
    /// Same-millisecond tie-break, internal to ordering and cursors.
    #[serde(skip_serializing)]
    pub seq: i64,
    pub edited_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub message_id: Option<String>,
    pub uploader_id: String,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub storage_key: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub thread_id: String,
    pub other_user: OtherUser,
    pub last_message: Message,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub body: Body,
    #[serde(default)]
    pub attachment_ids: Vec<String>,
    pub reply_to_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageRequest {
    pub body: Body,
}

#[derive(Debug, Deserialize)]
pub struct ToggleReactionRequest {
    pub emoji: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub at: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttachmentRequest {
    pub filename: String,
    pub content_type: String,
    pub size: i64,
}
