//! Unified error type for the relocation desk.

use thiserror::Error;

/// Every failure the library and the command-line surface can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable cause
        message: String,
    },

    /// Underlying database failure, including constraint violations not caught by form checks
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure (config files, media storage)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A form field failed validation
    #[error("Invalid value for {field}: {message}")]
    Validation {
        /// Field name as it appears on the form
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// A unique field already holds this value on another record
    #[error("{entity} with {field} '{value}' already exists")]
    Duplicate {
        /// Entity verbose name
        entity: &'static str,
        /// Unique field
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// No record with the given key
    #[error("{entity} '{key}' not found")]
    NotFound {
        /// Entity verbose name
        entity: &'static str,
        /// Primary or business key that was looked up
        key: String,
    },

    /// A value outside a field's fixed set of choices, or an unknown filter
    #[error("'{value}' is not a valid choice for {field}")]
    InvalidChoice {
        /// Field or filter name
        field: String,
        /// Rejected value
        value: String,
    },

    /// A form file could not be parsed
    #[error("Invalid form: {0}")]
    Form(#[from] toml::de::Error),

    /// JSON rendering failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Shorthand for a missing record.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
