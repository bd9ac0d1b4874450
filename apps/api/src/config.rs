use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the job-post backend, e.g. `https://<api>.execute-api.<region>.amazonaws.com/prod`.
    pub feed_base_url: String,
    pub feed_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
    pub undo_history_limit: usize,
    /// Color given to labels created without one.
    pub default_label_color: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            feed_base_url: require_env("FEED_BASE_URL")?,
            feed_timeout_secs: parse_env("FEED_TIMEOUT_SECS", 30)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            undo_history_limit: parse_env("UNDO_HISTORY_LIMIT", 100)?,
            default_label_color: std::env::var("DEFAULT_LABEL_COLOR")
                .unwrap_or_else(|_| "#ffd700".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
