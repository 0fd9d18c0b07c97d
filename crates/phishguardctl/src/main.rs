//! PhishGuard Control - CLI client for the PhishGuard daemon
//!
//! Operator interface: trainee stats, leaderboards, admin overviews,
//! and campaign management over the daemon's HTTP API.

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "phishguardctl")]
#[command(about = "PhishGuard - Security awareness training control", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon health
    Status,

    /// Show a trainee's training stats
    Stats {
        /// Trainee id
        trainee_id: i64,
    },

    /// Show a trainee's recent attempt reports
    Reports {
        /// Trainee id
        trainee_id: i64,
    },

    /// Show the organization leaderboard
    Leaderboard,

    /// Show the organization-wide admin overview
    Overview,

    /// List campaigns
    Campaigns,

    /// Launch a campaign against a department
    CampaignCreate {
        /// Campaign name
        name: String,

        /// Target department id
        #[arg(long)]
        dept: i64,

        /// Simulation kind (email, phone, deepfake)
        #[arg(long, default_value = "email")]
        kind: String,
    },

    /// Delete a campaign (attempts are kept)
    CampaignDelete {
        /// Campaign id
        id: i64,
    },

    /// Populate demo departments, trainees, and history
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => commands::status().await,
        Commands::Stats { trainee_id } => commands::stats(trainee_id).await,
        Commands::Reports { trainee_id } => commands::reports(trainee_id).await,
        Commands::Leaderboard => commands::leaderboard().await,
        Commands::Overview => commands::overview().await,
        Commands::Campaigns => commands::campaigns().await,
        Commands::CampaignCreate { name, dept, kind } => {
            commands::campaign_create(&name, dept, &kind).await
        }
        Commands::CampaignDelete { id } => commands::campaign_delete(id).await,
        Commands::Seed => commands::seed().await,
    }
}
