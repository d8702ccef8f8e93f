#![allow(dead_code)]

use std::{
    any::Any,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use karen::{
    Accounts, Result,
    backend::{UserStore, database::InMemory},
    user::{CredentialManager, HashParams, NewUser, UserRecord},
};

// ==========================
// CORE TEST FACTORIES
// ==========================
// Single point of change for backend matrix testing via TEST_BACKEND env var.

/// Creates a test store based on TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory store (default)
/// - "sqlite": SQLite in-memory backend (requires `sqlite` feature)
/// - "postgres": PostgreSQL backend (requires `postgres` feature and TEST_POSTGRES_URL)
///
/// # Example
/// ```bash
/// # Run tests with SQLite
/// TEST_BACKEND=sqlite cargo test --features sqlite
///
/// # Run tests with PostgreSQL
/// TEST_BACKEND=postgres TEST_POSTGRES_URL="postgres://localhost/karen_test" \
///   cargo test --features postgres
/// ```
pub async fn test_store() -> Arc<dyn UserStore> {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("sqlite") => {
            #[cfg(feature = "sqlite")]
            {
                use karen::backend::database::Sqlite;
                Arc::new(
                    Sqlite::sqlite_in_memory()
                        .await
                        .expect("Failed to create SQLite backend"),
                )
            }
            #[cfg(not(feature = "sqlite"))]
            {
                panic!("TEST_BACKEND=sqlite requires the 'sqlite' feature to be enabled")
            }
        }
        Ok("postgres") => {
            #[cfg(feature = "postgres")]
            {
                use karen::backend::database::Postgres;
                let url = std::env::var("TEST_POSTGRES_URL")
                    .unwrap_or_else(|_| "postgres://localhost/karen_test".to_string());
                Arc::new(
                    Postgres::connect_postgres_isolated(&url)
                        .await
                        .expect("Failed to connect to PostgreSQL"),
                )
            }
            #[cfg(not(feature = "postgres"))]
            {
                panic!("TEST_BACKEND=postgres requires the 'postgres' feature to be enabled")
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => Arc::new(InMemory::new()),
        Ok(other) => {
            panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, sqlite, postgres")
        }
    }
}

/// Cheap Argon2 parameters so tests stay fast.
pub fn fast_params() -> HashParams {
    HashParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn test_credentials() -> CredentialManager {
    CredentialManager::new(fast_params()).expect("Failed to build credential manager")
}

/// Accounts over the TEST_BACKEND store.
pub async fn test_accounts() -> Accounts {
    Accounts::new(test_store().await, test_credentials())
}

/// Accounts over a counting wrapper, for asserting which store calls were made.
pub async fn counted_accounts() -> (Accounts, Arc<CountingStore>) {
    let store = Arc::new(CountingStore::new(test_store().await));
    (Accounts::new(store.clone(), test_credentials()), store)
}

/// A `UserStore` that forwards every call and counts them.
pub struct CountingStore {
    inner: Arc<dyn UserStore>,
    creates: AtomicUsize,
    reads: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: Arc<dyn UserStore>) -> Self {
        Self {
            inner,
            creates: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total number of calls of any kind.
    pub fn calls(&self) -> usize {
        self.creates() + self.reads() + self.updates() + self.deletes()
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn create_user(&self, user: &NewUser) -> Result<i64> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create_user(user).await
    }

    async fn read_user(&self, id: i64) -> Result<UserRecord> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_user(id).await
    }

    async fn read_user_by_email(&self, email: &str) -> Result<UserRecord> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read_user_by_email(email).await
    }

    async fn update_user(&self, user: &UserRecord) -> Result<u64> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_user(user).await
    }

    async fn delete_user(&self, id: i64) -> Result<u64> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_user(id).await
    }

    fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A fully specified create request.
pub fn new_user_request(name: &str, email: &str, password: &str) -> karen::user::PartialUser {
    karen::user::PartialUser::new()
        .with_name(name)
        .with_email(email)
        .with_password(password)
}

/// A store-ready user with a fixed, non-verifiable hash.
pub fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
        avatar_url: None,
    }
}
