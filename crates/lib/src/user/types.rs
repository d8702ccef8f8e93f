//! Core data types for the user system

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::UserError;

/// A persisted user.
///
/// `id` is assigned by the store on creation and never changes afterwards.
/// `password_hash` is always an Argon2 PHC string, never a plaintext.
///
/// This type intentionally does not implement `Serialize`: the only outbound
/// representation is [`UserView`], which has no password field at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    /// Store-assigned identity (positive)
    pub id: i64,

    /// Display name
    pub name: String,

    /// Login identifier, unique across all users
    pub email: String,

    /// Password hash (Argon2id, PHC format)
    pub password_hash: String,

    /// Avatar location. `None` and `Some("")` are distinct states.
    pub avatar_url: Option<String>,
}

impl UserRecord {
    /// Full outbound representation.
    pub fn to_view(&self) -> UserView {
        UserView {
            id: Some(self.id),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            avatar_url: Some(self.avatar_url.clone()),
        }
    }

    /// Outbound representation restricted to `fields`.
    ///
    /// The id is not part of a projection.
    pub fn project(&self, fields: &[Field]) -> UserView {
        let mut view = UserView::default();
        for field in fields {
            match field {
                Field::Name => view.name = Some(self.name.clone()),
                Field::Email => view.email = Some(self.email.clone()),
                Field::AvatarUrl => view.avatar_url = Some(self.avatar_url.clone()),
            }
        }
        view
    }
}

/// A validated user ready to be inserted. The store assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
}

impl NewUser {
    /// Attach the id the store assigned.
    pub fn into_record(self, id: i64) -> UserRecord {
        UserRecord {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            avatar_url: self.avatar_url,
        }
    }
}

/// A request payload naming a subset of user fields.
///
/// For `name`, `email` and `password`, a missing key, `null` and `""` all mean
/// "not specified". For `avatar_url` the three are distinct:
///
/// | JSON                  | `avatar_url`        | Meaning                 |
/// |-----------------------|---------------------|-------------------------|
/// | key missing           | `None`              | leave unchanged         |
/// | `"avatar_url": null`  | `Some(None)`        | clear                   |
/// | `"avatar_url": ""`    | `Some(Some(""))`    | set to the empty string |
/// | `"avatar_url": "x"`   | `Some(Some("x"))`   | set to `"x"`            |
///
/// `password` is plaintext and must only ever be handed to the
/// [`CredentialManager`](super::crypto::CredentialManager).
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PartialUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(deserialize_with = "present")]
    pub avatar_url: Option<Option<String>>,
}

impl PartialUser {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the plaintext password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the avatar URL (the empty string is a real value).
    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(Some(avatar_url.into()));
        self
    }

    /// Clear the avatar URL.
    pub fn clear_avatar_url(mut self) -> Self {
        self.avatar_url = Some(None);
        self
    }

    /// The name, if specified.
    pub fn name(&self) -> Option<&str> {
        specified(&self.name)
    }

    /// The email with surrounding whitespace removed, if specified.
    pub fn email(&self) -> Option<&str> {
        specified(&self.email).map(str::trim).filter(|e| !e.is_empty())
    }

    /// The plaintext password, if specified.
    pub fn password(&self) -> Option<&str> {
        specified(&self.password)
    }

    /// The avatar URL update, if specified.
    pub fn avatar_url(&self) -> Option<Option<&str>> {
        self.avatar_url.as_ref().map(|url| url.as_deref())
    }

    /// True when the patch specifies no field at all.
    pub fn is_empty(&self) -> bool {
        self.name().is_none()
            && self.email().is_none()
            && self.password().is_none()
            && self.avatar_url.is_none()
    }
}

impl fmt::Debug for PartialUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("avatar_url", &self.avatar_url)
            .finish()
    }
}

fn specified(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Deserialize a field that is present in the input, including as `null`.
///
/// Combined with `#[serde(default)]` this separates a missing key (`None`)
/// from an explicit `null` (`Some(None)`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// The user fields a read can be projected onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    AvatarUrl,
}

impl Field {
    /// Every projectable field.
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::AvatarUrl];

    /// The wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::AvatarUrl => "avatar_url",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Field::Name),
            "email" => Ok(Field::Email),
            "avatar_url" => Ok(Field::AvatarUrl),
            other => Err(UserError::InvalidField {
                value: other.to_string(),
            }),
        }
    }
}

/// Outbound user representation.
///
/// Only fields that are `Some` are serialized. For `avatar_url`, `Some(None)`
/// serializes as `null` so an absent avatar stays distinguishable from an
/// empty one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub avatar_url: Option<Option<String>>,
}
