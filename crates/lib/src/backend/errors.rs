//! Storage error types for the Karen backend.
//!
//! This module defines structured error types for user storage operations.
//! Driver-specific conditions (such as a unique-key violation) are translated
//! into variants here once, so callers never inspect driver error codes.

use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Another user already has this email.
    #[error("User already exists with email {email}")]
    DuplicateEmail {
        /// The email that collided
        email: String,
    },

    /// No user with the given id.
    #[error("User not found: {id}")]
    UserNotFound {
        /// The id that was looked up
        id: i64,
    },

    /// No user with the given email.
    #[error("No user with email {email}")]
    EmailNotFound {
        /// The email that was looked up
        email: String,
    },

    /// A SQL operation failed.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description of what was being attempted
        reason: String,
        /// The underlying driver error, if any
        #[source]
        source: Option<sqlx::Error>,
    },

    /// Serialization failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Deserialization failed.
    #[error("Deserialization failed")]
    DeserializationFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Stored data contradicts itself.
    #[error("Store state inconsistency: {reason}")]
    StateInconsistency {
        /// Description of the inconsistency
        reason: String,
    },
}

impl BackendError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::UserNotFound { .. } | BackendError::EmailNotFound { .. }
        )
    }

    /// Check if this error indicates a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, BackendError::DuplicateEmail { .. })
    }

}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
