//!
//! Karen: a user-account service.
//! This library provides the credential handling, partial-update logic and storage
//! abstractions behind the Karen HTTP API.
//!
//! ## Core Concepts
//!
//! * **Credentials (`user::crypto::CredentialManager`)**: The only component that sees plaintext
//!   passwords. Hashes with Argon2id and verifies against stored PHC strings.
//! * **Patches (`user::merge`)**: Combines a stored `UserRecord` with a `PartialUser` into the
//!   next record state, field by field.
//! * **Stores (`backend::UserStore`)**: A pluggable persistence boundary for user records, with
//!   in-memory and SQL (SQLite / PostgreSQL) implementations.
//! * **Accounts (`user::Accounts`)**: The outward-facing operations (create, authenticate, read,
//!   patch, delete) built from the pieces above.
//! * **API (`api`)**: The axum router exposing `Accounts` over HTTP (requires the "service" feature).

#[cfg(feature = "service")]
pub mod api;
pub mod backend;
pub mod constants;
pub mod user;

pub use user::Accounts;

/// Result type used throughout the Karen library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Karen library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured user errors from the user module
    #[error(transparent)]
    User(user::UserError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::User(_) => "user",
            Error::Backend(_) => "backend",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_not_found(),
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is caused by a malformed or incomplete request.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::User(user_err) => user_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error is storage-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is a server-side failure the caller cannot act on.
    ///
    /// Covers hashing failures, corrupted stored hashes, and every storage error
    /// that is not a not-found or conflict condition.
    pub fn is_internal(&self) -> bool {
        !(self.is_not_found()
            || self.is_conflict()
            || self.is_validation_error()
            || self.is_authentication_error())
    }
}
