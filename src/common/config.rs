// src/common/config.rs
//! Runtime configuration read from the environment (and `.env` via dotenv)

use std::env;
use tracing::{info, warn};

use super::helpers::safe_token_log;

const DEFAULT_API_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Remote,
}

impl StorageBackend {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "local" => Some(StorageBackend::Local),
            "remote" => Some(StorageBackend::Remote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub backend: StorageBackend,
    pub remote: RemoteConfig,
    pub minimum_age: Option<u32>,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://registrations.db".to_string());

        let backend = match lookup("STORAGE_BACKEND") {
            None => StorageBackend::Local,
            Some(raw) => StorageBackend::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "Unknown STORAGE_BACKEND, falling back to local");
                StorageBackend::Local
            }),
        };

        let remote = RemoteConfig {
            base_url: lookup("API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            token: lookup("API_TOKEN").filter(|t| !t.trim().is_empty()),
            timeout_secs: lookup("API_TIMEOUT_SECS")
                .and_then(|t| t.parse::<u64>().ok())
                .unwrap_or(10),
        };

        let minimum_age = lookup("MINIMUM_AGE").and_then(|m| m.parse::<u32>().ok());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            port,
            database_url,
            backend,
            remote,
            minimum_age,
            cors_origins,
        }
    }
}

pub fn print_config_status(config: &AppConfig) {
    info!(
        port = config.port,
        backend = ?config.backend,
        minimum_age = ?config.minimum_age,
        "Configuration loaded"
    );
    if config.backend == StorageBackend::Remote {
        info!(
            api_url = %config.remote.base_url,
            token = %config.remote.token.as_deref().map(safe_token_log).unwrap_or_else(|| "none".to_string()),
            timeout_secs = config.remote.timeout_secs,
            "Using remote registration store"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, StorageBackend::Local);
        assert_eq!(config.remote.base_url, DEFAULT_API_URL);
        assert_eq!(config.remote.token, None);
        assert_eq!(config.minimum_age, None);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn test_remote_backend_with_token() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "Remote"),
            ("API_URL", "http://api.internal"),
            ("API_TOKEN", "abc123456789"),
            ("MINIMUM_AGE", "18"),
        ]);
        assert_eq!(config.backend, StorageBackend::Remote);
        assert_eq!(config.remote.base_url, "http://api.internal");
        assert_eq!(config.remote.token.as_deref(), Some("abc123456789"));
        assert_eq!(config.minimum_age, Some(18));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config_from(&[
            ("PORT", "not-a-port"),
            ("STORAGE_BACKEND", "floppy"),
            ("API_TOKEN", "  "),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend, StorageBackend::Local);
        assert_eq!(config.remote.token, None);
    }
}
