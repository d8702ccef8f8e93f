//! In-memory user store implementation
//!
//! This module provides an in-memory implementation of the `UserStore` trait,
//! suitable for testing, development, or single-node deployments where the
//! state is saved to a file on shutdown.

mod persistence;

use std::{
    any::Any,
    collections::{BTreeMap, HashMap},
    path::Path,
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Result,
    backend::{UserStore, errors::BackendError},
    user::{NewUser, UserRecord},
};

/// Mutable store state, guarded by a single lock so the email index can never
/// drift from the user map.
#[derive(Debug, Default)]
pub(crate) struct State {
    /// Users keyed by id
    pub(crate) users: BTreeMap<i64, UserRecord>,
    /// Unique index: email -> id
    pub(crate) emails: HashMap<String, i64>,
    /// Last id handed out. Ids are never reused, even after deletion.
    pub(crate) last_id: i64,
}

/// A simple in-memory user store.
///
/// It provides basic persistence capabilities via `save_to_file` and
/// `load_from_file`, serializing the state to JSON.
///
/// **Security Note**: only password hashes are held, never plaintexts, but
/// the saved file still contains every hash and should be protected
/// accordingly.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) state: RwLock<State>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users currently stored.
    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// True when no users are stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.users.is_empty()
    }

    /// Saves the entire store state to a specified file as JSON.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path).await
    }

    /// Loads the store state from a specified JSON file.
    ///
    /// If the file does not exist, a new, empty `InMemory` store is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded `InMemory` store or an I/O or deserialization error.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path).await
    }
}

#[async_trait]
impl UserStore for InMemory {
    async fn create_user(&self, user: &NewUser) -> Result<i64> {
        let mut state = self.state.write().await;
        if state.emails.contains_key(&user.email) {
            return Err(BackendError::DuplicateEmail {
                email: user.email.clone(),
            }
            .into());
        }

        state.last_id += 1;
        let id = state.last_id;
        state.emails.insert(user.email.clone(), id);
        state.users.insert(id, user.clone().into_record(id));
        Ok(id)
    }

    async fn read_user(&self, id: i64) -> Result<UserRecord> {
        let state = self.state.read().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| BackendError::UserNotFound { id }.into())
    }

    async fn read_user_by_email(&self, email: &str) -> Result<UserRecord> {
        let state = self.state.read().await;
        let id = state
            .emails
            .get(email)
            .ok_or_else(|| BackendError::EmailNotFound {
                email: email.to_string(),
            })?;
        state.users.get(id).cloned().ok_or_else(|| {
            BackendError::StateInconsistency {
                reason: format!("email index points at missing user {id}"),
            }
            .into()
        })
    }

    async fn update_user(&self, user: &UserRecord) -> Result<u64> {
        let mut state = self.state.write().await;
        let Some(previous_email) = state.users.get(&user.id).map(|u| u.email.clone()) else {
            return Ok(0);
        };

        if previous_email != user.email {
            if state.emails.contains_key(&user.email) {
                return Err(BackendError::DuplicateEmail {
                    email: user.email.clone(),
                }
                .into());
            }
            state.emails.remove(&previous_email);
            state.emails.insert(user.email.clone(), user.id);
        }

        state.users.insert(user.id, user.clone());
        Ok(1)
    }

    async fn delete_user(&self, id: i64) -> Result<u64> {
        let mut state = self.state.write().await;
        match state.users.remove(&id) {
            Some(user) => {
                state.emails.remove(&user.email);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn kind(&self) -> &'static str {
        "inmemory"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
