pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod store;

use config::Config;
use middleware::rate_limit::RateLimiter;
use store::Store;

pub struct AppState {
    pub db: sqlx::SqlitePool,
    pub store: Store,
    pub config: Config,
    pub limiter: RateLimiter,
}
