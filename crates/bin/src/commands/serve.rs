//! Serve command - runs the Karen HTTP server.

use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::EnvFilter;

use karen::{
    Accounts,
    backend::{UserStore, database::InMemory},
    user::{CredentialManager, HashParams},
};

use crate::backend::{SNAPSHOT_FILE, create_backend, data_dir};
use crate::cli::ServeArgs;

/// Run the Karen server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("karen=info")))
        .init();

    let store = create_backend(&args.backend_config).await?;

    let params = HashParams {
        memory_kib: args.hash_config.hash_memory_kib,
        iterations: args.hash_config.hash_iterations,
        parallelism: args.hash_config.hash_parallelism,
    };
    let credentials = CredentialManager::new(params)?;
    tracing::info!(?params, "Password hashing configured");

    let accounts = Accounts::new(store.clone(), credentials);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, backend = store.kind(), "Karen listening");

    karen::api::serve(listener, accounts, shutdown_signal()).await?;

    // Save user snapshot on shutdown (only needed for InMemory backend)
    if let Some(in_memory) = store.as_any().downcast_ref::<InMemory>() {
        let json_path = data_dir(&args.backend_config).join(SNAPSHOT_FILE);
        match in_memory.save_to_file(&json_path).await {
            Ok(()) => tracing::info!("Users saved to {}", json_path.display()),
            Err(e) => {
                tracing::error!("Failed to save users: {e:?}");
                return Err(e.into());
            }
        }
    }

    tracing::info!("Server shut down");
    Ok(())
}

/// Resolves on SIGTERM or SIGINT.
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to set up signal handlers: {e}");
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}
