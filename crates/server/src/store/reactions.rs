use std::collections::HashMap;

use ripple_shared::validation::validate_emoji;
use ripple_shared::ThreadId;

use crate::models::ReactionMap;

use super::{Result, Store, StoreError};

impl Store {
    /// Toggle one `(message, emoji, user)` triple: present removes it,
    /// absent adds it. Toggling twice is a net no-op. Returns the message's
    /// updated reaction map.
    pub async fn toggle_reaction(
        &self,
        message_id: &str,
        user_id: &str,
        emoji: &str,
    ) -> Result<ReactionMap> {
        validate_emoji(emoji).map_err(StoreError::InvalidInput)?;

        let thread_id =
            sqlx::query_scalar::<_, String>("SELECT thread_id FROM dm_messages WHERE id = ?")
                .bind(message_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| StoreError::NotFound("Message not found".into()))?;

        let thread = ThreadId::parse(&thread_id)
            .map_err(|_| StoreError::InvalidInput("Malformed thread id".into()))?;
        if !thread.is_participant(user_id) {
            return Err(StoreError::Forbidden(
                "Not a participant of this thread".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, String>(
            "SELECT id FROM reactions WHERE message_id = ? AND user_id = ? AND emoji = ?",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(emoji)
        .fetch_optional(&mut *tx)
        .await?;

        match existing {
            Some(reaction_id) => {
                sqlx::query("DELETE FROM reactions WHERE id = ?")
                    .bind(&reaction_id)
                    .execute(&mut *tx)
                    .await?;
            }
            None => {
                // unique (message_id, user_id, emoji) backs the check above
                sqlx::query(
                    "INSERT OR IGNORE INTO reactions (id, message_id, user_id, emoji, created_at) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(uuid::Uuid::new_v4().to_string())
                .bind(message_id)
                .bind(user_id)
                .bind(emoji)
                .bind(Self::now_ms())
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.reactions_for_message(message_id).await
    }

    pub async fn reactions_for_message(&self, message_id: &str) -> Result<ReactionMap> {
        let ids = [message_id.to_string()];
        let mut map = self.reactions_for_messages(&ids).await?;
        Ok(map.remove(message_id).unwrap_or_default())
    }

    /// Batch reaction maps keyed by message id; messages without reactions
    /// are absent from the result.
    pub async fn reactions_for_messages(
        &self,
        message_ids: &[String],
    ) -> Result<HashMap<String, ReactionMap>> {
        let mut result: HashMap<String, ReactionMap> = HashMap::new();
        if message_ids.is_empty() {
            return Ok(result);
        }

        let placeholders: Vec<String> = message_ids.iter().map(|_| "?".to_string()).collect();
        let sql = format!(
            "SELECT message_id, user_id, emoji FROM reactions \
             WHERE message_id IN ({}) ORDER BY created_at ASC, id ASC",
            placeholders.join(",")
        );

        let mut query = sqlx::query_as::<_, (String, String, String)>(&sql);
        for id in message_ids {
            query = query.bind(id);
        }

        for (message_id, user_id, emoji) in query.fetch_all(&self.pool).await? {
            result
                .entry(message_id)
                .or_default()
                .entry(emoji)
                .or_default()
                .push(user_id);
        }
        Ok(result)
    }
}
