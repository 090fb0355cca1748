//! Database configuration loaded from the environment.

use crate::error::{JoblyError, JoblyResult};

/// Connection URL used when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "postgresql:///jobly";

/// Connection URL used when `DATABASE_URL` is unset and `JOBLY_ENV=test`.
pub const DEFAULT_TEST_DATABASE_URL: &str = "postgresql:///jobly_test";

/// Default maximum pool size.
pub const DEFAULT_MAX_POOL_SIZE: usize = 16;

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// libpq-style connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_pool_size: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
        }
    }
}

impl DbConfig {
    /// Create a configuration for `database_url` with default pool settings.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Set the maximum pool size.
    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Load from the process environment, after applying a `.env` file if
    /// one exists.
    ///
    /// - `DATABASE_URL`: connection URL; defaults to [`DEFAULT_DATABASE_URL`],
    ///   or [`DEFAULT_TEST_DATABASE_URL`] when `JOBLY_ENV=test`.
    /// - `JOBLY_POOL_SIZE`: positive integer, defaults to 16.
    pub fn from_env() -> JoblyResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => url,
            _ if lookup("JOBLY_ENV").as_deref() == Some("test") => {
                DEFAULT_TEST_DATABASE_URL.to_string()
            }
            _ => DEFAULT_DATABASE_URL.to_string(),
        };

        let max_pool_size = match lookup("JOBLY_POOL_SIZE") {
            None => DEFAULT_MAX_POOL_SIZE,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(JoblyError::Config(format!(
                        "JOBLY_POOL_SIZE must be a positive integer, got '{}'",
                        raw
                    )));
                }
            },
        };

        Ok(Self {
            database_url,
            max_pool_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_the_development_database() {
        let config = DbConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DbConfig::default());
    }

    #[test]
    fn test_env_selects_the_test_database() {
        let config = DbConfig::from_lookup(lookup(&[("JOBLY_ENV", "test")])).unwrap();
        assert_eq!(config.database_url, DEFAULT_TEST_DATABASE_URL);
    }

    #[test]
    fn explicit_url_wins() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://u@db/jobly"),
            ("JOBLY_ENV", "test"),
            ("JOBLY_POOL_SIZE", "4"),
        ]))
        .unwrap();
        assert_eq!(config.database_url, "postgres://u@db/jobly");
        assert_eq!(config.max_pool_size, 4);
    }

    #[test]
    fn bad_pool_size_is_a_config_error() {
        for raw in ["0", "-1", "many"] {
            let err = DbConfig::from_lookup(lookup(&[("JOBLY_POOL_SIZE", raw)])).unwrap_err();
            assert!(matches!(err, JoblyError::Config(_)), "{raw}");
        }
    }
}
