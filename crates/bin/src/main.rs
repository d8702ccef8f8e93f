//! Karen server binary.

mod backend;
mod cli;
mod commands;

use clap::Parser;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        None => {
            // Bare `karen` behaves like `karen serve` with env/default settings
            let args = Cli::parse_from(["karen", "serve"]);
            match args.command {
                Some(Commands::Serve(args)) => commands::serve::run(&args).await,
                _ => Ok(()),
            }
        }
    }
}
