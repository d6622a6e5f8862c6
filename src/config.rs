use crate::database::pool::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONNECTIONS, PoolSettings};
use crate::database::queries::SqlQueries;
use crate::error::{Result, WikiError};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const SUPPORTED_DRIVER: &str = "sqlite";

#[derive(Clone, Debug)]
pub struct WikiConfig {
    pub database_url: String,
    pub database_driver: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub sql_queries_file: Option<PathBuf>,
    pub http_instances: usize,
    pub http_host: String,
    pub http_port: u16,
    pub wikidb_queue: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://wiki.db".to_string(),
            database_driver: SUPPORTED_DRIVER.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
            sql_queries_file: None,
            http_instances: 2,
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            wikidb_queue: "wikidb.queue".to_string(),
        }
    }
}

impl WikiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            database_driver: lookup("DATABASE_DRIVER").unwrap_or(defaults.database_driver),
            max_connections: parse_or(&lookup, "MAX_CONNECTIONS", defaults.max_connections)?,
            acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "POOL_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout.as_secs(),
            )?),
            sql_queries_file: lookup("SQL_QUERIES_FILE").map(PathBuf::from),
            http_instances: parse_or(&lookup, "HTTP_INSTANCES", defaults.http_instances)?,
            http_host: lookup("HTTP_HOST").unwrap_or(defaults.http_host),
            http_port: parse_or(&lookup, "HTTP_PORT", defaults.http_port)?,
            wikidb_queue: lookup("WIKIDB_QUEUE").unwrap_or(defaults.wikidb_queue),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_driver != SUPPORTED_DRIVER {
            return Err(WikiError::Config(format!(
                "unsupported database driver '{}', expected '{}'",
                self.database_driver, SUPPORTED_DRIVER
            )));
        }
        if self.max_connections == 0 {
            return Err(WikiError::Config("MAX_CONNECTIONS must be at least 1".to_string()));
        }
        if self.http_instances == 0 {
            return Err(WikiError::Config("HTTP_INSTANCES must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            database_url: self.database_url.clone(),
            max_connections: self.max_connections,
            acquire_timeout: self.acquire_timeout,
        }
    }

    /// The configured query catalog, or the built-in one.
    pub fn sql_queries(&self) -> Result<SqlQueries> {
        match &self.sql_queries_file {
            Some(path) => SqlQueries::from_file(path),
            None => SqlQueries::builtin(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| WikiError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}
