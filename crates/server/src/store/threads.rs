use ripple_shared::ThreadId;

use super::{Result, Store};

impl Store {
    pub async fn thread_exists(&self, thread: &ThreadId) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dm_threads WHERE id = ?")
            .bind(thread.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Every thread the user participates in, message history or not.
    pub async fn user_thread_ids(&self, user_id: &str) -> Result<Vec<ThreadId>> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT id FROM dm_threads WHERE user1_id = ? OR user2_id = ?",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|id| match ThreadId::parse(&id) {
                Ok(thread) => Some(thread),
                Err(_) => {
                    tracing::warn!("skipping malformed thread id in dm_threads: {}", id);
                    None
                }
            })
            .collect())
    }
}
