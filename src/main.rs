use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use churnlens::activity::collect::collect_activity;
use churnlens::config::Config;
use churnlens::model::artifacts;
use churnlens::model::scorer::RiskScorer;
use churnlens::output::terminal;
use churnlens::reddit::client::RedditClient;
use churnlens::web::AppState;

/// churnlens: Reddit engagement metrics and churn-risk scoring.
///
/// Pulls a user's most recent posts, derives engagement metrics, and runs
/// them through a placeholder churn model trained on synthetic data.
#[derive(Parser)]
#[command(name = "churnlens", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind (default: 0.0.0.0)
        #[arg(long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Fetch, aggregate and score a single profile
    Analyze {
        /// Reddit profile URL or bare username
        profile: String,
    },

    /// Re-fit the churn model on fresh synthetic data and overwrite the artifacts
    Train,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("churnlens=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_reddit()?;

            // The model must be ready before the listener accepts anything.
            let scorer = RiskScorer::load_or_train(&config.artifact_paths())?;
            info!(origin = scorer.origin().as_str(), "Churn model ready");

            let state = AppState {
                source: Arc::new(RedditClient::from_config(&config)?),
                scorer: Arc::new(scorer),
            };

            churnlens::web::run_server(state, port, &bind).await?;
        }

        Commands::Analyze { profile } => {
            let config = Config::load()?;
            config.require_reddit()?;

            let scorer = RiskScorer::load_or_train(&config.artifact_paths())?;
            let client = RedditClient::from_config(&config)?;

            println!("Fetching recent activity for {profile}...");
            let report = collect_activity(&client, &profile).await?;
            terminal::display_report(&report);

            let prediction = scorer.predict(&report.metrics)?;
            terminal::display_prediction(&prediction);
        }

        Commands::Train => {
            let config = Config::load()?;
            let paths = config.artifact_paths();

            println!("Training churn model on synthetic data...");
            let (scorer, report) = RiskScorer::fit_synthetic(&mut rand::rng())?;
            terminal::display_training(&report);

            artifacts::persist(&paths, scorer.scaler(), scorer.classifier())?;

            println!(
                "\n{}",
                format!(
                    "Artifacts written to {} and {}",
                    paths.scaler.display(),
                    paths.model.display()
                )
                .bold()
            );
        }
    }

    Ok(())
}
