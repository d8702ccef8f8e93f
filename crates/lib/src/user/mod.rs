//! User system for Karen
//!
//! Account records, password handling, partial updates and the account
//! operations built on top of a [`UserStore`](crate::backend::UserStore).

pub mod accounts;
pub mod crypto;
pub mod errors;
pub mod merge;
pub mod types;

pub use accounts::Accounts;
pub use crypto::{CredentialManager, HashParams};
pub use errors::UserError;
pub use merge::merge_patch;
pub use types::*;
