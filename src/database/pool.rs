use crate::error::{ConnectionFailure, Result, WikiError};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 30;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct PoolSettings {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

/// Bounded set of reusable database connections.
///
/// A connection handed out by [`ConnectionPool::acquire`] goes back to the
/// pool when the returned guard is dropped, so every exit path of a caller
/// (including `?` and panics) releases it exactly once. Waiting for a free
/// connection suspends the task, never the runtime thread.
#[derive(Clone, Debug)]
pub struct ConnectionPool {
    inner: Pool<Sqlite>,
}

impl ConnectionPool {
    pub async fn connect(settings: &PoolSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.database_url)
            .map_err(|e| {
                WikiError::Config(format!(
                    "invalid database url {}: {}",
                    settings.database_url, e
                ))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let inner = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(url = %settings.database_url, error = %e, "could not open the connection pool");
                WikiError::from(ConnectionFailure::ConnectFailed(e.to_string()))
            })?;

        tracing::info!(
            url = %settings.database_url,
            max_connections = settings.max_connections,
            "connection pool ready"
        );

        Ok(Self { inner })
    }

    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        self.inner.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => ConnectionFailure::Exhausted.into(),
            other => ConnectionFailure::ConnectFailed(other.to_string()).into(),
        })
    }

    pub async fn close(&self) {
        self.inner.close().await;
    }
}
