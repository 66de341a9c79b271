//! Process configuration read from the environment (after `.env` is loaded by the binary).

use crate::error::ConfigError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: String,
    pub database_schema: String,
    pub database_max_connections: u32,
    /// Owner recorded when a creation body has no `idUsuario`. Stands in for the caller identity.
    pub default_owner_id: i64,
    pub body_limit_bytes: usize,
    /// None allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".into(),
            port: 3000,
            storage: StorageBackend::Postgres,
            database_url: "postgres://localhost/cadastro".into(),
            database_schema: "public".into(),
            database_max_connections: 5,
            default_owner_id: 1,
            body_limit_bytes: 1024 * 1024,
            cors_allowed_origins: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = AppConfig::default();

        if let Some(v) = get("HOST") {
            config.host = v.trim().to_string();
        }
        if let Some(v) = get("PORT") {
            config.port = parse("PORT", &v)?;
        }
        if let Some(v) = get("STORAGE") {
            config.storage = v.parse().map_err(|_| invalid("STORAGE", &v))?;
        }
        if let Some(v) = get("DATABASE_URL") {
            config.database_url = v;
        }
        if let Some(v) = get("DATABASE_SCHEMA") {
            config.database_schema = v.trim().to_string();
        }
        if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
            config.database_max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = get("DEFAULT_OWNER_ID") {
            config.default_owner_id = parse("DEFAULT_OWNER_ID", &v)?;
        }
        if let Some(v) = get("BODY_LIMIT_BYTES") {
            config.body_limit_bytes = parse("BODY_LIMIT_BYTES", &v)?;
        }
        if let Some(v) = get("CORS_ALLOWED_ORIGINS") {
            let origins: Vec<String> = v
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            config.cors_allowed_origins = (!origins.is_empty() && origins.iter().all(|o| o != "*")).then_some(origins);
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let c = config(&[]).unwrap();
        assert_eq!(c.bind_addr(), "0.0.0.0:3000");
        assert_eq!(c.storage, StorageBackend::Postgres);
        assert_eq!(c.default_owner_id, 1);
        assert!(c.cors_allowed_origins.is_none());
    }

    #[test]
    fn values_are_read_and_parsed() {
        let c = config(&[
            ("PORT", "8080"),
            ("STORAGE", "Memory"),
            ("DEFAULT_OWNER_ID", "42"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test"),
            ("DATABASE_SCHEMA", " "),
        ])
        .unwrap();
        assert_eq!(c.port, 8080);
        assert_eq!(c.storage, StorageBackend::Memory);
        assert_eq!(c.default_owner_id, 42);
        assert_eq!(
            c.cors_allowed_origins,
            Some(vec!["http://a.test".to_string(), "http://b.test".to_string()])
        );
        assert_eq!(c.database_schema, "public");
    }

    #[test]
    fn wildcard_origin_means_any() {
        let c = config(&[("CORS_ALLOWED_ORIGINS", "*")]).unwrap();
        assert!(c.cors_allowed_origins.is_none());
    }

    #[test]
    fn invalid_values_name_the_key() {
        let err = config(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
        let err = config(&[("STORAGE", "redis")]).unwrap_err();
        assert!(err.to_string().contains("STORAGE"));
    }
}
