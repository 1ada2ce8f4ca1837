//! Error types for the database client

use citaflow_scheduling::store::StoreError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A row holds a value the domain model rejects
    #[error("Database row error: {0}")]
    RowError(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::SqlxError(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)
            | DbError::PoolError(_) => StoreError::Connection(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}
