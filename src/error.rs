use crate::database::queries::SqlQuery;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WikiError>;

/// Why a connection could not be handed out by the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "reason", content = "detail", rename_all = "kebab-case")]
pub enum ConnectionFailure {
    #[error("pool exhausted")]
    Exhausted,
    #[error("connect failed: {0}")]
    ConnectFailed(String),
}

/// Every failure the page store can report.
///
/// The serialized form (`{"kind": .., "detail": ..}`) is the error descriptor
/// carried by endpoint replies, so a remote caller sees the same variant the
/// store produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "kebab-case")]
pub enum WikiError {
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionFailure),

    #[error("query {operation} failed: {message}")]
    Query {
        operation: SqlQuery,
        message: String,
    },

    #[error("a page named '{0}' already exists")]
    DuplicateName(String),

    #[error("schema preparation failed: {0}")]
    Schema(String),

    #[error("storage integrity violated: {0}")]
    Integrity(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("service endpoint error: {0}")]
    Endpoint(String),
}

impl WikiError {
    /// Classifies a driver failure raised while running `operation`.
    pub fn from_sqlx(operation: SqlQuery, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => ConnectionFailure::Exhausted.into(),
            sqlx::Error::PoolClosed => {
                ConnectionFailure::ConnectFailed("pool is closed".to_string()).into()
            }
            sqlx::Error::Io(e) => ConnectionFailure::ConnectFailed(e.to_string()).into(),
            other => WikiError::Query {
                operation,
                message: other.to_string(),
            },
        }
    }
}
