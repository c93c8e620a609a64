use std::time::Duration;

use serde::Deserialize;

use crate::Secret;

#[inline]
fn _default_database_url() -> Secret<String> {
    Secret::new("sqlite:data/floodgate.sqlite3".to_owned())
}

const fn _default_pool_size() -> u32 {
    10
}

const fn _default_connect_timeout() -> Duration {
    Duration::from_secs(8)
}

#[derive(Debug, Deserialize, Clone)]
pub struct FloodgateConfig {
    #[serde(default = "_default_database_url")]
    pub database_url: Secret<String>,

    #[serde(default = "_default_pool_size")]
    pub pool_size: u32,

    #[serde(default = "_default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for FloodgateConfig {
    fn default() -> Self {
        Self {
            database_url: _default_database_url(),
            pool_size: _default_pool_size(),
            connect_timeout: _default_connect_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: FloodgateConfig = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config.database_url.expose_secret(), "sqlite:data/floodgate.sqlite3");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_humantime_durations() {
        let config: FloodgateConfig = serde_json::from_str(
            r#"{"database_url": "sqlite::memory:", "pool_size": 1, "connect_timeout": "30s"}"#,
        )
        .expect("deserialize");
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
    }
}
