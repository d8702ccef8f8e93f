//! The account operations exposed to the transport layer.
//!
//! [`Accounts`] ties a [`UserStore`] to a [`CredentialManager`]. Every slow
//! hash or verification is moved onto tokio's blocking pool so request
//! dispatch threads stay free.

use std::sync::Arc;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::{
    crypto::CredentialManager,
    errors::UserError,
    merge::merge_patch,
    types::{Field, NewUser, PartialUser, UserRecord, UserView},
};
use crate::{Error, Result, backend::UserStore};

/// Account operations over a pluggable store.
///
/// Cheap to clone; clones share the store and the hashing configuration.
#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn UserStore>,
    credentials: CredentialManager,
}

impl Accounts {
    /// Create the service from a store and a credential manager.
    pub fn new(store: Arc<dyn UserStore>, credentials: CredentialManager) -> Self {
        Self { store, credentials }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// The credential manager used for hashing.
    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Register a new user.
    ///
    /// `name`, `email` and `password` must all be specified. An `avatar_url`
    /// of `null` or a missing key both mean "no avatar".
    ///
    /// # Errors
    /// - `UserError::MissingFields` before anything is hashed or stored
    /// - `BackendError::DuplicateEmail` if the email is taken
    pub async fn create(&self, request: PartialUser) -> Result<UserRecord> {
        let mut missing = Vec::new();
        if request.name().is_none() {
            missing.push("name");
        }
        if request.email().is_none() {
            missing.push("email");
        }
        if request.password().is_none() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(UserError::MissingFields { fields: missing }.into());
        }

        let password = Zeroizing::new(request.password().unwrap_or_default().to_string());
        let password_hash = self.hash(password).await?;

        let new_user = NewUser {
            name: request.name().unwrap_or_default().to_string(),
            email: request.email().unwrap_or_default().to_string(),
            password_hash,
            avatar_url: request.avatar_url().flatten().map(str::to_string),
        };

        let id = self.store.create_user(&new_user).await.inspect_err(|e| {
            if e.is_conflict() {
                debug!("Rejected registration for an email already in use");
            }
        })?;
        info!(user_id = id, "Created user");
        Ok(new_user.into_record(id))
    }

    /// Check an email/password pair and return the matching user.
    ///
    /// An unknown email and a wrong password produce the same error, and take
    /// the same time, so callers cannot probe which emails are registered.
    ///
    /// # Errors
    /// - `UserError::MissingFields` if either input is empty
    /// - `UserError::InvalidCredentials` on any mismatch
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord> {
        let email = email.trim();
        let mut missing = Vec::new();
        if email.is_empty() {
            missing.push("email");
        }
        if password.is_empty() {
            missing.push("password");
        }
        if !missing.is_empty() {
            return Err(UserError::MissingFields { fields: missing }.into());
        }

        let password = Zeroizing::new(password.to_string());
        let user = match self.store.read_user_by_email(email).await {
            Ok(user) => user,
            Err(e) if e.is_not_found() => {
                let credentials = self.credentials.clone();
                self.blocking(move || {
                    credentials.equalize_timing(password.as_str());
                    Ok(())
                })
                .await?;
                debug!("Login attempt for unknown email");
                return Err(UserError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let credentials = self.credentials.clone();
        let password_hash = user.password_hash.clone();
        let matches = self
            .blocking(move || credentials.verify_password(password.as_str(), &password_hash))
            .await?;

        if !matches {
            debug!(user_id = user.id, "Login attempt with wrong password");
            return Err(UserError::InvalidCredentials.into());
        }
        debug!(user_id = user.id, "Authenticated user");
        Ok(user)
    }

    /// Fetch a user by id.
    pub async fn read(&self, id: i64) -> Result<UserRecord> {
        check_id(id)?;
        self.store.read_user(id).await
    }

    /// Fetch a user by id, keeping only `fields`.
    ///
    /// An empty `fields` list yields the full view.
    pub async fn read_projected(&self, id: i64, fields: &[Field]) -> Result<UserView> {
        let user = self.read(id).await?;
        if fields.is_empty() {
            Ok(user.to_view())
        } else {
            Ok(user.project(fields))
        }
    }

    /// Apply a partial update and return the new state.
    ///
    /// # Errors
    /// - `UserError::EmptyPatch` before any store call if `patch` names nothing
    /// - not-found if the user does not exist (or vanished mid-update)
    /// - `BackendError::DuplicateEmail` if the new email belongs to someone else
    pub async fn patch(&self, id: i64, patch: PartialUser) -> Result<UserRecord> {
        check_id(id)?;
        if patch.is_empty() {
            return Err(UserError::EmptyPatch.into());
        }

        let stored = self.store.read_user(id).await?;
        let merged = if patch.password().is_some() {
            let credentials = self.credentials.clone();
            self.blocking(move || merge_patch(&stored, &patch, &credentials))
                .await?
        } else {
            merge_patch(&stored, &patch, &self.credentials)?
        };

        let affected = self.store.update_user(&merged).await?;
        if affected == 0 {
            warn!(user_id = id, "User disappeared during update");
            return Err(UserError::UserNotFound { id }.into());
        }
        info!(user_id = id, "Updated user");
        Ok(merged)
    }

    /// Remove a user.
    pub async fn delete(&self, id: i64) -> Result<()> {
        check_id(id)?;
        let affected = self.store.delete_user(id).await?;
        if affected == 0 {
            return Err(UserError::UserNotFound { id }.into());
        }
        info!(user_id = id, "Deleted user");
        Ok(())
    }

    async fn hash(&self, password: Zeroizing<String>) -> Result<String> {
        let credentials = self.credentials.clone();
        self.blocking(move || credentials.hash_password(password.as_str()))
            .await
    }

    /// Run CPU-heavy credential work on the blocking pool.
    async fn blocking<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(work).await.map_err(|e| -> Error {
            UserError::HashingFailed {
                reason: format!("credential task failed: {e}"),
            }
            .into()
        })?
    }
}

impl std::fmt::Debug for Accounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accounts")
            .field("store", &self.store.kind())
            .field("credentials", &self.credentials)
            .finish()
    }
}

fn check_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(UserError::InvalidUserId { id }.into());
    }
    Ok(())
}
