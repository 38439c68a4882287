//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use storefront_observability::LogFormat;

pub const BIND_ADDR_VAR: &str = "STOREFRONT_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const DB_MAX_CONNECTIONS_VAR: &str = "STOREFRONT_DB_MAX_CONNECTIONS";
pub const LOG_FORMAT_VAR: &str = "STOREFRONT_LOG_FORMAT";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub log_format: LogFormat,
    /// Variables that were unset and fell back to a default.
    defaulted: Vec<&'static str>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut defaulted = Vec::new();

        let bind_addr = match get(BIND_ADDR_VAR) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(BIND_ADDR_VAR, e))?,
            None => {
                defaulted.push(BIND_ADDR_VAR);
                DEFAULT_BIND_ADDR
                    .parse()
                    .map_err(|e| ConfigError::invalid(BIND_ADDR_VAR, e))?
            }
        };

        let db_max_connections = match get(DB_MAX_CONNECTIONS_VAR) {
            Some(raw) => {
                let n: u32 = raw
                    .trim()
                    .parse()
                    .map_err(|e| ConfigError::invalid(DB_MAX_CONNECTIONS_VAR, e))?;
                if n == 0 {
                    return Err(ConfigError::invalid(DB_MAX_CONNECTIONS_VAR, "must be at least 1"));
                }
                n
            }
            None => {
                defaulted.push(DB_MAX_CONNECTIONS_VAR);
                DEFAULT_DB_MAX_CONNECTIONS
            }
        };

        let log_format = match get(LOG_FORMAT_VAR) {
            Some(raw) => raw
                .parse()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT_VAR, e))?,
            None => {
                defaulted.push(LOG_FORMAT_VAR);
                LogFormat::default()
            }
        };

        let database_url = get(DATABASE_URL_VAR);
        if database_url.is_none() {
            defaulted.push(DATABASE_URL_VAR);
        }

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections,
            log_format,
            defaulted,
        })
    }

    /// Warn about defaulted variables. Call once logging is up.
    pub fn log_defaults(&self) {
        for var in &self.defaulted {
            match *var {
                DATABASE_URL_VAR => tracing::warn!("{var} not set; using the in-memory catalog store"),
                _ => tracing::warn!("{var} not set; using default"),
            }
        }
    }

    pub fn defaulted(&self) -> &[&'static str] {
        &self.defaulted
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.db_max_connections, 5);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.defaulted().len(), 4);
    }

    #[test]
    fn explicit_values_are_used() {
        let cfg = config(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (DATABASE_URL_VAR, "postgres://localhost/catalog"),
            (DB_MAX_CONNECTIONS_VAR, "12"),
            (LOG_FORMAT_VAR, "pretty"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/catalog"));
        assert_eq!(cfg.db_max_connections, 12);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert!(cfg.defaulted().is_empty());
    }

    #[test]
    fn blank_database_url_means_in_memory() {
        let cfg = config(&[(DATABASE_URL_VAR, "   ")]).unwrap();
        assert_eq!(cfg.database_url, None);
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = config(&[(DB_MAX_CONNECTIONS_VAR, "many")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: DB_MAX_CONNECTIONS_VAR, .. }));

        let err = config(&[(DB_MAX_CONNECTIONS_VAR, "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: DB_MAX_CONNECTIONS_VAR, .. }));

        let err = config(&[(BIND_ADDR_VAR, "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: BIND_ADDR_VAR, .. }));

        let err = config(&[(LOG_FORMAT_VAR, "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: LOG_FORMAT_VAR, .. }));
    }
}
