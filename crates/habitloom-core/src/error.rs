//! Core error types for habitloom-core.
//!
//! This module defines a comprehensive error hierarchy using thiserror
//! for better error handling and reporting across the library.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for habitloom-core.
#[derive(Error, Debug)]
pub enum HabitError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Completion attempted against a strict-cadence habit that is not due
    #[error("habit '{habit}' is not due on {day}")]
    NotDue { habit: String, day: NaiveDate },

    /// Completion attempted against an archived habit
    #[error("habit '{0}' is archived")]
    Archived(String),

    /// Completion rating outside the 1..=5 range
    #[error("rating {0} is out of range (1-5)")]
    InvalidRating(u8),

    /// Referenced record does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Optimistic version check failed; the caller should reload and retry
    #[error("habit {habit_id} was modified concurrently")]
    ConflictingUpdate { habit_id: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row failed to decode into its model type
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// A uniqueness or foreign-key constraint was violated
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => match e.code {
                rusqlite::ErrorCode::DatabaseLocked => DatabaseError::Locked,
                rusqlite::ErrorCode::ConstraintViolation => {
                    DatabaseError::ConstraintViolation(err.to_string())
                }
                _ => DatabaseError::QueryFailed(err.to_string()),
            },
            // Row decode failures (bad enum tag, bad date, bad frequency
            // JSON) must surface loudly, never fall back to defaults.
            rusqlite::Error::FromSqlConversionFailure(..) => {
                DatabaseError::CorruptRecord(err.to_string())
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for HabitError {
    fn from(err: rusqlite::Error) -> Self {
        HabitError::Database(DatabaseError::from(err))
    }
}

/// Result type alias for HabitError
pub type Result<T, E = HabitError> = std::result::Result<T, E>;
