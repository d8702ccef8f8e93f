//! Error types for the user system
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserError {
    /// Create request without one or more required fields.
    #[error("Request body is missing field(s): {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    /// Patch request that specifies nothing.
    #[error(r#"Request body must have one of "email", "name", "password", or "avatar_url""#)]
    EmptyPatch,

    #[error("Invalid user ID: {id}")]
    InvalidUserId { id: i64 },

    #[error("Invalid includes format: {value}")]
    InvalidField { value: String },

    #[error("User not found: {id}")]
    UserNotFound { id: i64 },

    /// Wrong password or unknown email. The two are never distinguished.
    #[error("{}", crate::constants::INVALID_CREDENTIALS)]
    InvalidCredentials,

    #[error("Password hashing failed: {reason}")]
    HashingFailed { reason: String },

    #[error("Stored password hash is malformed: {reason}")]
    MalformedHash { reason: String },
}

impl UserError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::UserNotFound { .. })
    }

    /// Check if this error was caused by the request itself.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            UserError::MissingFields { .. }
                | UserError::EmptyPatch
                | UserError::InvalidUserId { .. }
                | UserError::InvalidField { .. }
        )
    }

    /// Check if this error is a failed login.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, UserError::InvalidCredentials)
    }
}

impl From<UserError> for crate::Error {
    fn from(err: UserError) -> Self {
        crate::Error::User(err)
    }
}
