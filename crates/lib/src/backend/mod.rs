//! Backend implementations for Karen storage
//!
//! This module provides the core `UserStore` trait and its implementations.
//!
//! The `UserStore` trait is the persistence boundary for user records. The account
//! logic (`user::Accounts`) only talks to this trait, so it is independent of the
//! specific storage mechanism.

use std::any::Any;

use async_trait::async_trait;

use crate::Result;
use crate::user::{NewUser, UserRecord};

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// Persistence boundary for user records.
///
/// Implementations own their transactional discipline: creation must be atomic
/// (a failed create leaves no row behind), and update/delete must report how
/// many rows they touched so callers can tell whether the target existed.
///
/// Uniqueness violations on `email` are reported as
/// `BackendError::DuplicateEmail`, whatever the underlying driver calls them.
///
/// All implementations must be `Send` and `Sync` to allow sharing across tasks,
/// and implement `Any` to allow for downcasting if needed.
#[async_trait]
pub trait UserStore: Send + Sync + Any {
    /// Insert a new user and return the id the store assigned.
    ///
    /// # Errors
    /// `BackendError::DuplicateEmail` if the email is taken. Nothing is
    /// persisted on any error.
    async fn create_user(&self, user: &NewUser) -> Result<i64>;

    /// Fetch a user by id.
    ///
    /// # Errors
    /// `BackendError::UserNotFound` if no such user exists.
    async fn read_user(&self, id: i64) -> Result<UserRecord>;

    /// Fetch a user by email.
    ///
    /// # Errors
    /// `BackendError::EmailNotFound` if no such user exists.
    async fn read_user_by_email(&self, email: &str) -> Result<UserRecord>;

    /// Overwrite every mutable field of the user with `user.id`.
    ///
    /// # Returns
    /// The number of rows affected; `0` if the user does not exist.
    ///
    /// # Errors
    /// `BackendError::DuplicateEmail` if the new email belongs to another user.
    async fn update_user(&self, user: &UserRecord) -> Result<u64>;

    /// Remove a user.
    ///
    /// # Returns
    /// The number of rows affected; `0` if the user does not exist.
    async fn delete_user(&self, id: i64) -> Result<u64>;

    /// Short name of the storage kind, used for health reporting.
    fn kind(&self) -> &'static str;

    /// Returns a reference to the store as a `dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
