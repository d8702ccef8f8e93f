//! Persistence operations for the InMemory store
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory store state to/from JSON files.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{InMemory, State};
use crate::{Error, Result, backend::errors::BackendError, user::UserRecord};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk form of a user.
///
/// Kept separate from `UserRecord` so the domain type never gains a
/// `Serialize` impl that could leak a hash onto the wire.
#[derive(Serialize, Deserialize)]
struct StoredUser {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl From<&UserRecord> for StoredUser {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl From<StoredUser> for UserRecord {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            avatar_url: user.avatar_url,
        }
    }
}

/// Serializable version of the InMemory store for persistence
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    last_id: i64,
    users: Vec<StoredUser>,
}

impl SerializableStore {
    /// Rebuild the live state, including the email index.
    fn into_state(self) -> Result<State> {
        let mut state = State {
            last_id: self.last_id,
            ..State::default()
        };
        for user in self.users {
            let user = UserRecord::from(user);
            if user.id > state.last_id {
                return Err(BackendError::StateInconsistency {
                    reason: format!("user {} is above last id {}", user.id, state.last_id),
                }
                .into());
            }
            if state.emails.insert(user.email.clone(), user.id).is_some() {
                return Err(BackendError::DuplicateEmail { email: user.email }.into());
            }
            let id = user.id;
            if state.users.insert(id, user).is_some() {
                return Err(BackendError::StateInconsistency {
                    reason: format!("user {id} appears more than once"),
                }
                .into());
            }
        }
        Ok(state)
    }
}

/// Saves the entire store state to a specified file as JSON.
///
/// # Arguments
/// * `backend` - The InMemory store to save
/// * `path` - The path to the file where the state should be saved.
///
/// # Returns
/// A `Result` indicating success or an I/O or serialization error.
pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let serializable = {
        let state = backend.state.read().await;
        SerializableStore {
            version: PERSISTENCE_VERSION,
            last_id: state.last_id,
            users: state.users.values().map(StoredUser::from).collect(),
        }
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| -> Error { BackendError::FileIo { source: e }.into() })
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
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let serializable: SerializableStore =
                serde_json::from_str(&json).map_err(|e| -> Error {
                    BackendError::DeserializationFailed { source: e }.into()
                })?;
            Ok(InMemory {
                state: RwLock::new(serializable.into_state()?),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
