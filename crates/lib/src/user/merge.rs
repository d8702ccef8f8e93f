//! Patch merge logic for user records.
//!
//! Computes the next state of a stored user from a partial update, one field
//! at a time:
//! - `id`: always kept from the stored record
//! - `name`, `email`: patch value if specified, stored value otherwise
//! - `password`: if specified, hashed and the hash replaces the stored one
//! - `avatar_url`: patch value if specified (including clear and empty), stored value otherwise
//!
//! What counts as "specified" is defined by [`PartialUser`].

use super::crypto::CredentialManager;
use super::types::{PartialUser, UserRecord};
use crate::Result;

/// Merge a partial update into a stored user record.
///
/// The stored record is not modified; a new record is returned so callers can
/// compare old and new state. An empty patch yields a copy of `stored`.
/// Rejecting empty patches is the caller's job.
///
/// # Errors
/// Only fails if the patch carries a password and hashing it fails.
///
/// # Examples
/// ```
/// use karen::user::{CredentialManager, HashParams, PartialUser, UserRecord, merge_patch};
///
/// let credentials = CredentialManager::new(HashParams::default()).unwrap();
/// let stored = UserRecord {
///     id: 1,
///     name: "Ana".to_string(),
///     email: "ana@x.com".to_string(),
///     password_hash: credentials.hash_password("secret1").unwrap(),
///     avatar_url: None,
/// };
///
/// let patch = PartialUser::new().with_avatar_url("http://x/a.png");
/// let merged = merge_patch(&stored, &patch, &credentials).unwrap();
///
/// assert_eq!(merged.name, "Ana");
/// assert_eq!(merged.avatar_url.as_deref(), Some("http://x/a.png"));
/// assert_eq!(merged.password_hash, stored.password_hash);
/// ```
pub fn merge_patch(
    stored: &UserRecord,
    patch: &PartialUser,
    credentials: &CredentialManager,
) -> Result<UserRecord> {
    let password_hash = match patch.password() {
        Some(password) => credentials.hash_password(password)?,
        None => stored.password_hash.clone(),
    };

    Ok(UserRecord {
        id: stored.id,
        name: patch.name().unwrap_or(&stored.name).to_string(),
        email: patch.email().unwrap_or(&stored.email).to_string(),
        password_hash,
        avatar_url: match patch.avatar_url() {
            Some(avatar_url) => avatar_url.map(str::to_string),
            None => stored.avatar_url.clone(),
        },
    })
}
