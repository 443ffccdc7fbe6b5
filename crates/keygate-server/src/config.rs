//! Server configuration, read from `KEYGATE_*` environment variables.

use keygate_core::error::{KeygateError, KeygateResult};
use keygate_db::DbConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    pub port: u16,
    /// Explicit CORS origin allow-list.
    pub allowed_origins: Vec<String>,
    /// Optional server-side pepper for password hashing/verification.
    pub pepper: Option<String>,
    pub db: DbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            allowed_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:5173".into(),
            ],
            pepper: None,
            db: DbConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build a configuration from the environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> KeygateResult<Self> {
        let defaults = Self::default();
        let db_defaults = defaults.db.clone();

        let port = match std::env::var("KEYGATE_PORT") {
            Ok(raw) => raw.parse().map_err(|_| KeygateError::Validation {
                message: format!("KEYGATE_PORT is not a valid port: {raw}"),
            })?,
            Err(_) => defaults.port,
        };

        let allowed_origins = std::env::var("KEYGATE_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Ok(Self {
            host: env_or("KEYGATE_HOST", defaults.host),
            port,
            allowed_origins,
            pepper: std::env::var("KEYGATE_PEPPER").ok(),
            db: DbConfig {
                endpoint: env_or("KEYGATE_DB_ENDPOINT", db_defaults.endpoint),
                namespace: env_or("KEYGATE_DB_NAMESPACE", db_defaults.namespace),
                database: env_or("KEYGATE_DB_DATABASE", db_defaults.database),
                username: std::env::var("KEYGATE_DB_USERNAME")
                    .ok()
                    .or(db_defaults.username),
                password: std::env::var("KEYGATE_DB_PASSWORD")
                    .ok()
                    .or(db_defaults.password),
            },
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.allowed_origins.len(), 2);
        assert!(config.pepper.is_none());
    }
}
