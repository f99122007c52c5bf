use std::collections::HashMap;

use ripple_shared::validation::validate_message_body;
use ripple_shared::{Body, Envelope, ThreadId};

use crate::models::{Attachment, Message, PaginatedResponse};

use super::{Result, Store, StoreError};

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    thread_id: String,
    sender_id: String,
    encrypted: i64,
    body: String,
    iv: Option<String>,
    reply_to_id: Option<String>,
    created_at: i64,
    seq: i64,
    edited_at: Option<i64>,
}

impl MessageRow {
    /// The stored `encrypted` flag decides the variant; body content is
    /// never sniffed.
    fn into_message(self, attachments: Vec<Attachment>) -> Message {
        let body = if self.encrypted != 0 {
            Body::Encrypted(Envelope {
                cipher_text: self.body,
                iv: self.iv.unwrap_or_default(),
            })
        } else {
            Body::Plaintext(self.body)
        };

        Message {
            id: self.id,
            thread_id: self.thread_id,
            sender_id: self.sender_id,
            body,
            attachments,
            reply_to_id: self.reply_to_id,
            created_at: self.created_at,
            seq: self.seq,
            edited_at: self.edited_at,
        }
    }
}

fn body_columns(body: &Body) -> (i64, &str, Option<&str>) {
    match body {
        Body::Plaintext(text) => (0, text.as_str(), None),
        Body::Encrypted(envelope) => (1, envelope.cipher_text.as_str(), Some(envelope.iv.as_str())),
    }
}

fn parse_cursor(cursor: &str) -> Result<(i64, i64)> {
    cursor
        .split_once(':')
        .and_then(|(at, seq)| Some((at.parse().ok()?, seq.parse().ok()?)))
        .ok_or_else(|| StoreError::InvalidInput("Malformed cursor".into()))
}

impl Store {
    /// Append a message, creating the thread if this is the first send
    /// between the pair.
    ///
    /// `(created_at, seq)` is totally ordered per thread: `created_at` never
    /// moves backward even if the wall clock does, and `seq` breaks
    /// same-millisecond ties.
    pub async fn append(
        &self,
        thread: &ThreadId,
        sender_id: &str,
        body: &Body,
        attachment_ids: &[String],
        reply_to_id: Option<&str>,
    ) -> Result<Message> {
        if !thread.is_participant(sender_id) {
            return Err(StoreError::Forbidden(
                "Not a participant of this thread".into(),
            ));
        }
        validate_message_body(body, attachment_ids.len()).map_err(StoreError::InvalidInput)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = Self::now_ms();
        let (user1, user2) = thread.participants();

        let mut tx = self.pool.begin().await?;

        // First write in the transaction takes SQLite's write lock, so
        // concurrent appends serialize before the ordering read below.
        sqlx::query(
            "INSERT OR IGNORE INTO dm_threads (id, user1_id, user2_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(thread.as_str())
        .bind(user1)
        .bind(user2)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(reply_to) = reply_to_id {
            let target_thread = sqlx::query_scalar::<_, String>(
                "SELECT thread_id FROM dm_messages WHERE id = ?",
            )
            .bind(reply_to)
            .fetch_optional(&mut *tx)
            .await?;

            if target_thread.as_deref() != Some(thread.as_str()) {
                return Err(StoreError::InvalidInput(
                    "Reply target is not a message in this thread".into(),
                ));
            }
        }

        let last = sqlx::query_as::<_, (i64, i64)>(
            "SELECT created_at, seq FROM dm_messages WHERE thread_id = ? \
             ORDER BY created_at DESC, seq DESC LIMIT 1",
        )
        .bind(thread.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let (created_at, seq) = match last {
            Some((at, s)) if now <= at => (at, s + 1),
            _ => (now, 0),
        };

        let (encrypted, body_text, iv) = body_columns(body);
        sqlx::query(
            "INSERT INTO dm_messages (id, thread_id, sender_id, encrypted, body, iv, reply_to_id, created_at, seq) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(thread.as_str())
        .bind(sender_id)
        .bind(encrypted)
        .bind(body_text)
        .bind(iv)
        .bind(reply_to_id)
        .bind(created_at)
        .bind(seq)
        .execute(&mut *tx)
        .await?;

        // Claim attachments: only the sender's own, only while unlinked
        for att_id in attachment_ids {
            let linked = sqlx::query(
                "UPDATE attachments SET message_id = ? \
                 WHERE id = ? AND uploader_id = ? AND message_id IS NULL",
            )
            .bind(&id)
            .bind(att_id)
            .bind(sender_id)
            .execute(&mut *tx)
            .await?;

            if linked.rows_affected() == 0 {
                return Err(StoreError::InvalidInput(format!(
                    "Unknown or already linked attachment: {}",
                    att_id
                )));
            }
        }

        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE message_id = ?",
        )
        .bind(&id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Message {
            id,
            thread_id: thread.as_str().to_string(),
            sender_id: sender_id.to_string(),
            body: body.clone(),
            attachments,
            reply_to_id: reply_to_id.map(|r| r.to_string()),
            created_at,
            seq,
            edited_at: None,
        })
    }

    /// Replace a message body. Only the sender may edit; a racing delete
    /// wins (the update finds no row and the edit reports `NotFound`).
    pub async fn edit(
        &self,
        message_id: &str,
        requester_id: &str,
        new_body: &Body,
    ) -> Result<Message> {
        let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM dm_messages WHERE id = ?")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Message not found".into()))?;

        if row.sender_id != requester_id {
            return Err(StoreError::Forbidden("Not your message".into()));
        }

        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE message_id = ?",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;

        validate_message_body(new_body, attachments.len()).map_err(StoreError::InvalidInput)?;

        let edited_at = Self::now_ms();
        let (encrypted, body_text, iv) = body_columns(new_body);
        let updated = sqlx::query(
            "UPDATE dm_messages SET encrypted = ?, body = ?, iv = ?, edited_at = ? WHERE id = ?",
        )
        .bind(encrypted)
        .bind(body_text)
        .bind(iv)
        .bind(edited_at)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("Message not found".into()));
        }

        Ok(Message {
            id: row.id,
            thread_id: row.thread_id,
            sender_id: row.sender_id,
            body: new_body.clone(),
            attachments,
            reply_to_id: row.reply_to_id,
            created_at: row.created_at,
            seq: row.seq,
            edited_at: Some(edited_at),
        })
    }

    /// Hard delete. Reactions go with the message; replies keep their
    /// now-dangling `reply_to_id`. A second delete sees `NotFound`.
    pub async fn delete(&self, message_id: &str, requester_id: &str) -> Result<()> {
        let sender_id =
            sqlx::query_scalar::<_, String>("SELECT sender_id FROM dm_messages WHERE id = ?")
                .bind(message_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| StoreError::NotFound("Message not found".into()))?;

        if sender_id != requester_id {
            return Err(StoreError::Forbidden("Not your message".into()));
        }

        let deleted = sqlx::query("DELETE FROM dm_messages WHERE id = ?")
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::NotFound("Message not found".into()));
        }

        Ok(())
    }

    /// Page of messages, ascending `(created_at, seq)` within the page.
    /// The cursor points at the oldest returned message; passing it back
    /// fetches the strictly older page.
    pub async fn list(
        &self,
        thread: &ThreadId,
        cursor: Option<&str>,
        limit: i64,
    ) -> Result<PaginatedResponse<Message>> {
        let limit = limit.clamp(1, 100);

        let rows = if let Some(cursor) = cursor {
            let (at, seq) = parse_cursor(cursor)?;
            sqlx::query_as::<_, MessageRow>(
                "SELECT * FROM dm_messages WHERE thread_id = ? AND (created_at, seq) < (?, ?) \
                 ORDER BY created_at DESC, seq DESC LIMIT ?",
            )
            .bind(thread.as_str())
            .bind(at)
            .bind(seq)
            .bind(limit + 1)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, MessageRow>(
                "SELECT * FROM dm_messages WHERE thread_id = ? \
                 ORDER BY created_at DESC, seq DESC LIMIT ?",
            )
            .bind(thread.as_str())
            .bind(limit + 1)
            .fetch_all(&self.pool)
            .await?
        };

        let has_more = rows.len() as i64 > limit;
        let mut rows = rows;
        if has_more {
            rows.pop();
        }
        rows.reverse(); // chronological order

        let cursor = rows.first().map(|m| format!("{}:{}", m.created_at, m.seq));

        let ids: Vec<String> = rows.iter().map(|m| m.id.clone()).collect();
        let mut attachment_map = self.attachment_map(&ids).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let attachments = attachment_map.remove(&row.id).unwrap_or_default();
                row.into_message(attachments)
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            cursor,
            has_more,
        })
    }

    /// The single most recent message of a thread, if any.
    pub async fn latest(&self, thread: &ThreadId) -> Result<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT * FROM dm_messages WHERE thread_id = ? \
             ORDER BY created_at DESC, seq DESC LIMIT 1",
        )
        .bind(thread.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attachments = sqlx::query_as::<_, Attachment>(
            "SELECT * FROM attachments WHERE message_id = ?",
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_message(attachments)))
    }

    /// Batch-fetch attachments for a list of messages.
    async fn attachment_map(
        &self,
        message_ids: &[String],
    ) -> Result<HashMap<String, Vec<Attachment>>> {
        let mut attachment_map: HashMap<String, Vec<Attachment>> = HashMap::new();
        if message_ids.is_empty() {
            return Ok(attachment_map);
        }

        let placeholders: Vec<String> = message_ids.iter().map(|_| "?".to_string()).collect();
        let sql = format!(
            "SELECT * FROM attachments WHERE message_id IN ({})",
            placeholders.join(",")
        );

        let mut query = sqlx::query_as::<_, Attachment>(&sql);
        for id in message_ids {
            query = query.bind(id);
        }

        for att in query.fetch_all(&self.pool).await? {
            if let Some(ref mid) = att.message_id {
                attachment_map.entry(mid.clone()).or_default().push(att);
            }
        }
        Ok(attachment_map)
    }
}
