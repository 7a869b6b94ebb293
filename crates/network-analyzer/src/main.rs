//! Network Analyzer CLI
//!
//! Runs one collector-network analysis from a JSON scenario file and
//! prints the resulting report. With `--persist`, the run is also
//! written to the configured database.

use anyhow::{Context, Result};
use clap::Parser;
use network_analyzer::{AnalysisService, NetworkAnalyzer};
use provenance_core::config::{AnalysisConfig, Config};
use provenance_core::db;
use provenance_core::provider::{FundingTotal, InMemoryTransferHistory};
use provenance_core::types::{IdentitySignals, TransferRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "network-analyzer")]
#[command(about = "Collector-network authenticity analysis")]
struct Cli {
    /// JSON scenario file with the artist, collectors, and transfers.
    scenario: PathBuf,

    /// Persist the run to the database configured via DATABASE_URL.
    #[arg(long)]
    persist: bool,
}

/// Offline input: everything the provider would normally serve.
#[derive(Deserialize)]
struct Scenario {
    artist: String,
    collectors: Vec<String>,
    transfers: Vec<TransferRecord>,
    #[serde(default)]
    funding: HashMap<String, Vec<FundingTotal>>,
    #[serde(default)]
    identities: HashMap<String, IdentitySignals>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "network_analyzer=info,provenance_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let raw = std::fs::read_to_string(&cli.scenario)
        .with_context(|| format!("reading scenario {}", cli.scenario.display()))?;
    let scenario: Scenario = serde_json::from_str(&raw).context("parsing scenario JSON")?;

    info!(
        artist = %scenario.artist,
        collectors = scenario.collectors.len(),
        transfers = scenario.transfers.len(),
        "Loaded scenario"
    );

    let mut provider = InMemoryTransferHistory::new(scenario.transfers.clone());
    for (address, funding) in scenario.funding {
        provider = provider.with_funding(address, funding);
    }
    for (address, signals) in scenario.identities {
        provider = provider.with_identity(address, signals);
    }

    let analyzer = NetworkAnalyzer::new(provider, AnalysisConfig::from_env());

    let analysis = if cli.persist {
        let config = Config::from_env().context("DATABASE_URL required with --persist")?;
        let pool = db::create_pool(&config.database).await?;
        db::run_migrations(&pool).await?;
        let service = AnalysisService::new(analyzer, db::AnalysisRepository::new(pool));
        service
            .run(&scenario.artist, &scenario.collectors, &scenario.transfers)
            .await?
    } else {
        analyzer
            .analyze_artist_network(&scenario.artist, &scenario.collectors, &scenario.transfers)
            .await?
            .analysis
    };

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
