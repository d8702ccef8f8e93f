//! Password hashing for the user system
//!
//! The [`CredentialManager`] is the only place plaintext passwords are handled.
//! Passwords are hashed with Argon2id into PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`), each with a fresh random
//! salt. The cost parameters travel inside the PHC string, so a hash produced
//! under one configuration still verifies after the configuration changes.
//!
//! Nothing here can recover a plaintext: there is no decryption path.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;

use super::errors::UserError;
use crate::Result;

/// Default Argon2 memory cost in KiB (19 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 19_456;

/// Default Argon2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 2;

/// Default Argon2 degree of parallelism.
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Argon2id cost parameters.
///
/// The defaults cost roughly as much wall-clock time as bcrypt with a work
/// factor of 12 on current server hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes over memory
    pub iterations: u32,
    /// Number of lanes
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

/// Hashes and verifies passwords.
///
/// Holds no mutable state; cloning is cheap and every method may be called
/// concurrently. Hashing is deliberately slow, so async callers should run it
/// on a blocking pool.
#[derive(Clone)]
pub struct CredentialManager {
    argon2: Argon2<'static>,
    params: HashParams,
}

impl CredentialManager {
    /// Create a credential manager using the given cost parameters.
    ///
    /// # Errors
    /// Returns `UserError::HashingFailed` if Argon2 rejects the parameters
    /// (for example a memory cost below `8 * parallelism`).
    pub fn new(params: HashParams) -> Result<Self> {
        let argon2_params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| UserError::HashingFailed {
            reason: format!("Invalid hash parameters: {e}"),
        })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params),
            params,
        })
    }

    /// The cost parameters new hashes are produced with.
    pub fn params(&self) -> HashParams {
        self.params
    }

    /// Hash a plaintext password.
    ///
    /// Two calls with the same plaintext return different strings because each
    /// hash embeds its own random salt.
    pub fn hash_password(&self, password: impl AsRef<str>) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_ref().as_bytes(), &salt)
            .map_err(|e| UserError::HashingFailed {
                reason: e.to_string(),
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a plaintext password against a stored PHC hash.
    ///
    /// # Returns
    /// `Ok(true)` on a match, `Ok(false)` on a mismatch.
    ///
    /// # Errors
    /// Returns `UserError::MalformedHash` if `password_hash` is not a PHC
    /// string this manager can check.
    pub fn verify_password(
        &self,
        password: impl AsRef<str>,
        password_hash: impl AsRef<str>,
    ) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(password_hash.as_ref()).map_err(|e| UserError::MalformedHash {
                reason: e.to_string(),
            })?;

        match self
            .argon2
            .verify_password(password.as_ref().as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(UserError::MalformedHash {
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Spend the same work a verification would, without checking anything.
    ///
    /// Used when a login names an unknown account so that the response time
    /// does not reveal whether the email exists.
    pub fn equalize_timing(&self, password: impl AsRef<str>) {
        let _ = self.hash_password(password);
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("params", &self.params)
            .finish()
    }
}
