//! Health check command - checks a running Karen server.

use std::time::Duration;

use serde_json::Value;

use crate::cli::HealthArgs;

/// Build the health endpoint URL from a base URL.
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Run the health check command
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let response = match client.get(&url).send().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("unhealthy: failed to connect to {url}: {e}");
            std::process::exit(1);
        }
    };

    if !response.status().is_success() {
        eprintln!(
            "unhealthy: server returned HTTP status {}",
            response.status()
        );
        std::process::exit(1);
    }

    let body: Value = response.json().await?;
    match body.get("status").and_then(Value::as_str) {
        Some("healthy") => {
            let backend = body.get("backend").and_then(Value::as_str).unwrap_or("?");
            println!("healthy (backend: {backend})");
            Ok(())
        }
        status => {
            eprintln!("unhealthy: server reported status {}", status.unwrap_or("<missing>"));
            std::process::exit(1);
        }
    }
}
