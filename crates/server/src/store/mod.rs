mod conversations;
mod error;
mod messages;
mod read_markers;
mod reactions;
mod threads;

pub use error::{Result, StoreError};

use sqlx::SqlitePool;

/// Typed repository owning every SQL statement for threads, messages,
/// read markers, and reactions. Handlers hold a `Store` and never touch
/// these tables directly.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}
