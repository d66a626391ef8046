use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("Invalid {key} value {value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub api_prefix: String,
    pub admin_password: Option<String>,
    pub token_secret: Option<String>,
    pub token_ttl_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: try_load(&lookup, "PORT", "5000")?,
            database_url: optional(&lookup, "DATABASE_URL"),
            max_connections: non_zero(
                "DATABASE_MAX_CONNECTIONS",
                try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
            )?,
            run_migrations: try_load(&lookup, "RUN_MIGRATIONS", "true")?,
            api_prefix: normalize_prefix(&optional(&lookup, "API_PREFIX").unwrap_or_default()),
            admin_password: optional(&lookup, "ADMIN_PASSWORD"),
            token_secret: optional(&lookup, "TOKEN_SECRET"),
            token_ttl_secs: non_zero("TOKEN_TTL_SECS", try_load(&lookup, "TOKEN_TTL_SECS", "3600")?)?,
        })
    }
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = optional(lookup, key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            reason: e.to_string(),
            value,
        }
    })
}

/// A zero pool size or token lifetime would leave the server unusable.
fn non_zero<T: Default + PartialEq + Display>(key: &'static str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        warn!("Invalid {key} value: must be greater than zero");
        return Err(ConfigError {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// `"api/"` and `"/api"` both become `"/api"`; blank or `"/"` means no prefix.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_connections, 5);
        assert!(config.run_migrations);
        assert_eq!(config.api_prefix, "");
        assert_eq!(config.database_url, None);
        assert_eq!(config.admin_password, None);
        assert_eq!(config.token_ttl_secs, 3600);
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("DATABASE_URL", "postgres://localhost/cafe"),
            ("RUN_MIGRATIONS", "false"),
            ("API_PREFIX", "api/"),
            ("ADMIN_PASSWORD", "hunter2"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/cafe"));
        assert!(!config.run_migrations);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = config(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.key, "PORT");
        assert_eq!(err.value, "eighty");
    }

    #[test]
    fn rejects_zero_token_lifetime_and_pool_size() {
        let err = config(&[("TOKEN_TTL_SECS", "0")]).unwrap_err();
        assert_eq!(err.key, "TOKEN_TTL_SECS");
        assert_eq!(err.value, "0");

        let err = config(&[("DATABASE_MAX_CONNECTIONS", "0")]).unwrap_err();
        assert_eq!(err.key, "DATABASE_MAX_CONNECTIONS");

        assert_eq!(config(&[("TOKEN_TTL_SECS", "1")]).unwrap().token_ttl_secs, 1);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[("DATABASE_URL", "  "), ("API_PREFIX", "/")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.api_prefix, "");
    }
}
