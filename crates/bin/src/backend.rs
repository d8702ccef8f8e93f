//! Backend creation and utility functions.

use std::{path::PathBuf, sync::Arc};

use karen::backend::{
    UserStore,
    database::{InMemory, Postgres, Sqlite},
};

use crate::cli::{Backend, BackendConfig};

/// SQLite database file name inside the data directory
pub const SQLITE_FILE: &str = "karen.db";

/// In-memory snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "karen.json";

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Resolve the data directory, defaulting to the working directory.
pub fn data_dir(config: &BackendConfig) -> PathBuf {
    config
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Create the appropriate store based on configuration
pub async fn create_backend(
    config: &BackendConfig,
) -> Result<Arc<dyn UserStore>, Box<dyn std::error::Error>> {
    let data_dir = data_dir(config);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    match config.backend {
        Backend::Sqlite => {
            let db_path = data_dir.join(SQLITE_FILE);
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Arc::new(Sqlite::open_sqlite(&db_path).await?))
        }
        Backend::Postgres => {
            let url = config
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or KAREN_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match Postgres::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Arc::new(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {}: {}", display_url, e).into())
                }
            }
        }
        Backend::Inmemory => {
            let json_path = data_dir.join(SNAPSHOT_FILE);
            tracing::info!(
                "Using in-memory backend with persistence at {}",
                json_path.display()
            );
            // A missing file yields an empty store; a corrupt one is fatal so
            // it is never silently overwritten on shutdown.
            let backend = InMemory::load_from_file(&json_path).await?;
            tracing::info!(users = backend.len().await, "Loaded user snapshot");
            Ok(Arc::new(backend))
        }
    }
}
