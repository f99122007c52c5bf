use std::env;

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub session_ttl_days: i64,
    /// Message sends allowed per second, per sender.
    pub message_rate: f64,
    /// Burst capacity of the per-sender token bucket.
    pub message_burst: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "./ripple.db".into()),
            session_ttl_days: env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            message_rate: env::var("MESSAGE_RATE_PER_SEC")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1.0),
            message_burst: env::var("MESSAGE_BURST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10.0),
        }
    }
}
