//! Constants used throughout the Karen library.
//!
//! This module provides central definitions for request headers,
//! route prefixes and other strings shared between the store and the API.

/// Request header carrying the caller's user id on `/self` routes.
pub const USER_ID_HEADER: &str = "User-ID";

/// Route prefix for every user endpoint.
pub const USERS_PATH: &str = "/karen/v1/users";

/// Query parameter selecting which fields a read returns.
pub const INCLUDES_PARAM: &str = "includes";

/// Body returned for every internal failure; details only go to the log.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Message for any failed login, whether the email or the password was wrong.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
