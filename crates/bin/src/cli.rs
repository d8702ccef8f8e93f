//! CLI argument definitions for the Karen binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use karen::user::crypto::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM};

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database (default, production-ready)
    Sqlite,
    /// PostgreSQL database (for shared deployments)
    Postgres,
    /// In-memory with JSON persistence (for development and ephemeral deployments)
    Inmemory,
}

/// Karen user account server
#[derive(Parser, Debug)]
#[command(name = "karen")]
#[command(about = "Karen: user accounts over HTTP")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Karen server
    Serve(ServeArgs),
    /// Check health of a running Karen server
    Health(HealthArgs),
}

/// Storage configuration shared by commands that open a store
#[derive(clap::Args, Debug, Clone)]
pub struct BackendConfig {
    /// Storage backend to use
    #[arg(short, long, default_value = "sqlite", env = "KAREN_BACKEND")]
    pub backend: Backend,

    /// Data directory for storage files.
    /// For SQLite: stores karen.db
    /// For InMemory: stores karen.json
    #[arg(short = 'D', long, env = "KAREN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// PostgreSQL connection URL (required when backend=postgres)
    #[arg(long, env = "KAREN_POSTGRES_URL")]
    pub postgres_url: Option<String>,
}

/// Argon2id cost parameters
#[derive(clap::Args, Debug, Clone)]
pub struct HashConfig {
    /// Memory cost in KiB
    #[arg(long, default_value_t = DEFAULT_MEMORY_KIB, env = "KAREN_HASH_MEMORY_KIB")]
    pub hash_memory_kib: u32,

    /// Number of iterations
    #[arg(long, default_value_t = DEFAULT_ITERATIONS, env = "KAREN_HASH_ITERATIONS")]
    pub hash_iterations: u32,

    /// Degree of parallelism
    #[arg(long, default_value_t = DEFAULT_PARALLELISM, env = "KAREN_HASH_PARALLELISM")]
    pub hash_parallelism: u32,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 80, env = "KAREN_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "KAREN_HOST")]
    pub host: String,

    #[command(flatten)]
    pub backend_config: BackendConfig,

    #[command(flatten)]
    pub hash_config: HashConfig,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(short, long, default_value = "http://127.0.0.1:80", env = "KAREN_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
