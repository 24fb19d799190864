//! veracityctl - one-shot claim verification from the command line
//!
//! Builds the engine in-process from the same config the daemon uses, so a
//! claim can be checked without a running veracityd.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use veracity_core::{Aggregator, BatchScheduler, Claim, VerificationCache, VerifierConfig};

#[derive(Parser)]
#[command(name = "veracityctl", version, about = "Verify factual claims")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify a single claim
    Verify {
        /// The claim text
        text: String,
        /// Optional surrounding context
        #[arg(long)]
        context: Option<String>,
    },
    /// Verify a batch of claims from a JSON file
    Batch {
        /// Path to a JSON array of {id?, text, context?} objects
        file: String,
    },
}

/// Claim as it appears in a batch file; ids are optional there.
#[derive(Debug, Deserialize)]
struct FileClaim {
    id: Option<String>,
    text: String,
    context: Option<String>,
}

fn build_engine(config: &VerifierConfig) -> Result<(Aggregator, Arc<VerificationCache>)> {
    let cache = Arc::new(VerificationCache::new(Duration::from_secs(
        config.cache.ttl_secs,
    )));
    let aggregator = Aggregator::from_config(config, cache.clone())?;
    Ok((aggregator, cache))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = VerifierConfig::load()?;

    match cli.command {
        Command::Verify { text, context } => {
            let (aggregator, _cache) = build_engine(&config)?;
            let mut claim = Claim::new(Uuid::new_v4().to_string(), text);
            claim.context = context;

            let outcome = aggregator.verify_one(&claim).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Batch { file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file))?;
            let file_claims: Vec<FileClaim> = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", file))?;
            anyhow::ensure!(!file_claims.is_empty(), "{} contains no claims", file);

            let claims: Vec<Claim> = file_claims
                .into_iter()
                .map(|fc| {
                    let mut claim = Claim::new(
                        fc.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                        fc.text,
                    );
                    claim.context = fc.context;
                    claim
                })
                .collect();

            let (aggregator, _cache) = build_engine(&config)?;
            let scheduler =
                BatchScheduler::new(&aggregator, Duration::from_millis(config.batch.pacing_ms));
            let outcome = scheduler.run(&claims).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}
