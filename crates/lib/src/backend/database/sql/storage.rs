//! User storage operations for SQL backends.
//!
//! This module implements the CRUD operations for user rows using sqlx.

use crate::Result;
use crate::backend::errors::BackendError;
use crate::user::{NewUser, UserRecord};

use super::{SqlxBackend, SqlxResultExt};

/// Row shape shared by every user SELECT.
type UserRow = (i64, String, String, String, Option<String>);

const SELECT_USER: &str = "SELECT id, name, email, password_hash, avatar_url FROM users";

fn into_record((id, name, email, password_hash, avatar_url): UserRow) -> UserRecord {
    UserRecord {
        id,
        name,
        email,
        password_hash,
        avatar_url,
    }
}

/// Map a failed write to `DuplicateEmail` when the driver reports a unique
/// violation, otherwise to a generic SQL error.
fn write_error(e: sqlx::Error, email: &str, context: &str) -> crate::Error {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return BackendError::DuplicateEmail {
            email: email.to_string(),
        }
        .into();
    }
    BackendError::SqlxError {
        reason: format!("{context}: {e}"),
        source: Some(e),
    }
    .into()
}

/// Insert a user inside a transaction and return the assigned id.
pub async fn create_user(backend: &SqlxBackend, user: &NewUser) -> Result<i64> {
    let mut tx = backend
        .pool()
        .begin()
        .await
        .sql_context("Failed to begin transaction")?;

    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO users (name, email, password_hash, avatar_url)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(user.name.clone())
    .bind(user.email.clone())
    .bind(user.password_hash.clone())
    .bind(user.avatar_url.clone())
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| write_error(e, &user.email, "Failed to insert user"))?;

    tx.commit()
        .await
        .sql_context("Failed to commit transaction")?;

    Ok(id)
}

/// Get a user by id.
pub async fn read_user(backend: &SqlxBackend, id: i64) -> Result<UserRecord> {
    let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(backend.pool())
        .await
        .sql_context("Failed to get user")?;

    row.map(into_record)
        .ok_or_else(|| BackendError::UserNotFound { id }.into())
}

/// Get a user by email.
pub async fn read_user_by_email(backend: &SqlxBackend, email: &str) -> Result<UserRecord> {
    let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE email = $1"))
        .bind(email.to_string())
        .fetch_optional(backend.pool())
        .await
        .sql_context("Failed to get user by email")?;

    row.map(into_record).ok_or_else(|| {
        BackendError::EmailNotFound {
            email: email.to_string(),
        }
        .into()
    })
}

/// Overwrite every mutable column of a user row.
pub async fn update_user(backend: &SqlxBackend, user: &UserRecord) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE users
         SET name = $1, email = $2, password_hash = $3, avatar_url = $4
         WHERE id = $5",
    )
    .bind(user.name.clone())
    .bind(user.email.clone())
    .bind(user.password_hash.clone())
    .bind(user.avatar_url.clone())
    .bind(user.id)
    .execute(backend.pool())
    .await
    .map_err(|e| write_error(e, &user.email, "Failed to update user"))?;

    Ok(result.rows_affected())
}

/// Delete a user row.
pub async fn delete_user(backend: &SqlxBackend, id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(backend.pool())
        .await
        .sql_context("Failed to delete user")?;

    Ok(result.rows_affected())
}
