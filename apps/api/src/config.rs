use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Caller-side limit per query; `0` disables it.
    pub query_timeout_ms: u64,
    pub max_sessions: usize,
    /// Idle sessions are closed after this many seconds; `0` keeps them
    /// until deleted.
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            query_timeout_ms: parse_env("QUERY_TIMEOUT_MS", 5000)?,
            max_sessions: parse_env("MAX_SESSIONS", 256)?,
            session_idle_secs: parse_env("SESSION_IDLE_SECS", 1800)?,
        })
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }

    pub fn session_idle_ttl(&self) -> Option<Duration> {
        (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(query_timeout_ms: u64) -> Config {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            query_timeout_ms,
            max_sessions: 1,
            session_idle_secs: 0,
        }
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        assert_eq!(config(0).query_timeout(), None);
        assert_eq!(config(250).query_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_zero_idle_secs_disables_expiry() {
        let mut cfg = config(0);
        assert_eq!(cfg.session_idle_ttl(), None);
        cfg.session_idle_secs = 90;
        assert_eq!(cfg.session_idle_ttl(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_parse_env_default_and_error() {
        assert_eq!(parse_env("SIMLAB_TEST_UNSET_VAR", 7_u16).unwrap(), 7);

        std::env::set_var("SIMLAB_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("SIMLAB_TEST_BAD_PORT", 8080).unwrap_err();
        assert!(err.to_string().contains("SIMLAB_TEST_BAD_PORT"));

        std::env::set_var("SIMLAB_TEST_GOOD_PORT", " 9090 ");
        assert_eq!(parse_env::<u16>("SIMLAB_TEST_GOOD_PORT", 8080).unwrap(), 9090);
    }
}
