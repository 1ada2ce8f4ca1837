// --- File: crates/citaflow_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for infrastructure-level Citaflow failures.
///
/// Domain outcomes (a full office, a passed deadline) have their own enums in
/// the scheduling crate; this type covers the unexpected failures every crate
/// can hit.
#[derive(Error, Debug)]
pub enum CitaflowError {
    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to a conflict (e.g., resource already exists)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<serde_json::Error> for CitaflowError {
    fn from(err: serde_json::Error) -> Self {
        CitaflowError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for CitaflowError {
    fn from(err: std::io::Error) -> Self {
        CitaflowError::InternalError(err.to_string())
    }
}

// Utility constructors for error handling
pub fn config_error<T: fmt::Display>(message: T) -> CitaflowError {
    CitaflowError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> CitaflowError {
    CitaflowError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> CitaflowError {
    CitaflowError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> CitaflowError {
    CitaflowError::ConflictError(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> CitaflowError {
    CitaflowError::InternalError(message.to_string())
}
