use ripple_shared::ThreadId;

use super::{Result, Store, StoreError};

impl Store {
    /// Record how far the user has read. The marker is monotonic: a stale
    /// client cannot move it backward (the upsert clamps to the max).
    /// Returns the effective marker.
    pub async fn mark_read(
        &self,
        thread: &ThreadId,
        user_id: &str,
        at: Option<i64>,
    ) -> Result<i64> {
        if !thread.is_participant(user_id) {
            return Err(StoreError::Forbidden(
                "Not a participant of this thread".into(),
            ));
        }
        if !self.thread_exists(thread).await? {
            return Err(StoreError::NotFound("Thread not found".into()));
        }

        let at = at.unwrap_or_else(Self::now_ms);

        sqlx::query(
            "INSERT INTO read_markers (thread_id, user_id, last_read_at) VALUES (?, ?, ?) \
             ON CONFLICT(thread_id, user_id) \
             DO UPDATE SET last_read_at = MAX(last_read_at, excluded.last_read_at)",
        )
        .bind(thread.as_str())
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        let marker = sqlx::query_scalar::<_, i64>(
            "SELECT last_read_at FROM read_markers WHERE thread_id = ? AND user_id = ?",
        )
        .bind(thread.as_str())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(marker)
    }

    pub async fn last_read_at(&self, thread: &ThreadId, user_id: &str) -> Result<Option<i64>> {
        let marker = sqlx::query_scalar::<_, i64>(
            "SELECT last_read_at FROM read_markers WHERE thread_id = ? AND user_id = ?",
        )
        .bind(thread.as_str())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(marker)
    }

    /// Messages newer than the user's marker. The user's own messages are
    /// never unread to them; with no marker, every message from the other
    /// participant counts.
    pub async fn unread_count(&self, thread: &ThreadId, user_id: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM dm_messages \
             WHERE thread_id = ? AND sender_id != ? AND created_at > \
               COALESCE((SELECT last_read_at FROM read_markers \
                         WHERE thread_id = ? AND user_id = ?), -1)",
        )
        .bind(thread.as_str())
        .bind(user_id)
        .bind(thread.as_str())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
