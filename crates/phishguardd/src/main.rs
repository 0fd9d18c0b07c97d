//! PhishGuard daemon - training progression engine
//!
//! Serves the HTTP API: simulation generation, attempt scoring and
//! progression, analytics rollups, and admin operations.

use anyhow::Result;
use clap::Parser;
use phishguard_common::{GenAiClient, GuardConfig, GuardStore};
use phishguardd::server::{self, AppState};
use std::path::PathBuf;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "phishguardd")]
#[command(about = "PhishGuard daemon - security awareness training backend", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file path (default: /etc/phishguard/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Populate demo departments, trainees, and history before serving
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("PhishGuard Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match cli.config {
        Some(path) => GuardConfig::load_from(path),
        None => GuardConfig::load(),
    };

    let store = GuardStore::open_at(&config.db_path)?;
    info!(
        "Store ready at {} (schema v{})",
        config.db_path,
        store.schema_version()?
    );

    if cli.seed {
        let summary = phishguard_common::seed::seed_demo_data(&store)?;
        if summary.seeded {
            info!(
                "Seeded demo data: {} departments, {} trainees, {} attempts",
                summary.departments, summary.trainees, summary.attempts
            );
        } else {
            info!("Seed skipped: departments already present");
        }
    }

    let api_key = GuardConfig::api_key().unwrap_or_default();
    if api_key.is_empty() {
        warn!("GEMINI_API_KEY not set; generation endpoints will fail");
    }
    let genai = GenAiClient::from_settings(&config.genai, &api_key);
    if genai.has_key() {
        match genai.verify_key().await {
            Ok(()) => info!("Generation provider key verified"),
            Err(e) => warn!("Generation provider key check failed: {}", e),
        }
    }

    info!("PhishGuard Daemon ready");
    server::run(AppState::new(store, genai, config)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_config_and_seed() {
        let cli = Cli::try_parse_from(["phishguardd", "--config", "/tmp/g.toml", "--seed"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/tmp/g.toml")));
        assert!(cli.seed);
    }

    #[test]
    fn test_cli_rejects_config_without_value() {
        assert!(Cli::try_parse_from(["phishguardd", "--config"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["phishguardd", "--reset"]).is_err());
    }
}
