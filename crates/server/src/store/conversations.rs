use crate::models::{Conversation, OtherUser};

use super::{Result, Store};

impl Store {
    /// Per-user inbox: one row per thread with at least one message, newest
    /// activity first. Recomputed from the ledger and markers on every call,
    /// so it can never drift from them.
    pub async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>> {
        let threads = self.user_thread_ids(user_id).await?;

        let mut conversations = Vec::new();
        for thread in threads {
            // a thread whose messages were all deleted drops out of the inbox
            let Some(last_message) = self.latest(&thread).await? else {
                continue;
            };

            let Some(other_id) = thread.other(user_id) else {
                continue;
            };

            let other_user = sqlx::query_as::<_, OtherUser>(
                "SELECT id, username, image FROM users WHERE id = ?",
            )
            .bind(other_id)
            .fetch_optional(&self.pool)
            .await?;

            let Some(other_user) = other_user else {
                continue;
            };

            let unread_count = self.unread_count(&thread, user_id).await?;

            conversations.push(Conversation {
                thread_id: thread.as_str().to_string(),
                other_user,
                last_message,
                unread_count,
            });
        }

        conversations.sort_by(|a, b| {
            (b.last_message.created_at, b.last_message.seq)
                .cmp(&(a.last_message.created_at, a.last_message.seq))
        });

        Ok(conversations)
    }
}
