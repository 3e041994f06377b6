//! Error types for khoj.
//!
//! Every fallible operation in the crate returns [`Result`], so callers see a
//! single error type whether a failure came from validation, the status
//! lifecycle, the companion matcher or the underlying database.

use std::path::PathBuf;
use thiserror::Error;

use crate::complaint::ComplaintKind;
use crate::identity::Role;

/// The main error type for khoj operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Complaint Errors ===
    /// A required field was missing or malformed.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// No complaint of this kind has the given id.
    #[error("no {kind} complaint with id {id}")]
    UnknownComplaint {
        /// Kind of complaint that was looked up.
        kind: ComplaintKind,
        /// The id that was not found.
        id: i64,
    },

    /// The status is not part of the complaint kind's vocabulary.
    #[error("'{status}' is not a valid status for {kind} complaints")]
    InvalidStatus {
        /// Kind of complaint being transitioned.
        kind: ComplaintKind,
        /// The rejected status value.
        status: String,
    },

    // === Companion Errors ===
    /// No travel companion request has the given id.
    #[error("no travel companion request with id {id}")]
    UnknownCompanionRequest {
        /// The id that was not found.
        id: i64,
    },

    /// The companion request was already accepted or rejected.
    #[error("travel companion request {id} is already {status}")]
    CompanionRequestClosed {
        /// Id of the request.
        id: i64,
        /// Its terminal status.
        status: String,
    },

    // === Identity Errors ===
    /// No profile is registered under this email.
    #[error("no user registered with email {email}")]
    UnknownUser {
        /// The email that was looked up.
        email: String,
    },

    /// Registering a profile failed.
    #[error("registration failed")]
    Registration,

    /// The acting user lacks the role an operation needs.
    #[error("this action requires the {required} role (you are {actual})")]
    RoleRequired {
        /// Role the operation needs.
        required: Role,
        /// Role of the acting user.
        actual: Role,
    },

    /// The acting user is not allowed to act on this record.
    #[error("not permitted: {0}")]
    NotPermitted(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for khoj operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for a field.
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Create a validation error for an empty required field.
    #[must_use]
    pub fn empty_field(field: &'static str) -> Self {
        Self::validation(field, "must not be empty")
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a not-permitted error.
    #[must_use]
    pub fn not_permitted(message: impl Into<String>) -> Self {
        Self::NotPermitted(message.into())
    }

    /// Check if this error means a referenced record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UnknownComplaint { .. }
                | Self::UnknownCompanionRequest { .. }
                | Self::UnknownUser { .. }
        )
    }

    /// Check if this error is an input validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidStatus { .. })
    }
}
