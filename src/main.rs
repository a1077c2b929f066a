//! Roulette Table Binary
//!
//! Plays headless rounds against an in-memory wallet.

use clap::Parser;
use roulette_table::config::{generate_sample_config, ConfigLoader};
use roulette_table::{BetSpot, InMemoryWallet, RandomSource, TableSession, WalletService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roulette-table")]
#[command(about = "Single-table European roulette", long_about = None)]
struct Args {
    /// Path to a TOML table configuration
    #[arg(long)]
    config: Option<String>,

    /// Seed for a reproducible wheel
    #[arg(long)]
    seed: Option<u64>,

    /// Bet as SPOT=AMOUNT, e.g. straight:17=10 or red=50 (repeatable)
    #[arg(long = "bet", value_parser = parse_bet)]
    bets: Vec<(BetSpot, u64)>,

    /// Number of rounds to play with the same bets
    #[arg(long, default_value = "1")]
    rounds: u32,

    /// Starting wallet balance
    #[arg(long, default_value = "1000")]
    balance: u64,

    /// Skip spin and cooldown delays
    #[arg(long)]
    fast: bool,

    /// Print each round result as JSON
    #[arg(long)]
    json: bool,

    /// Write a sample configuration to this path and exit
    #[arg(long)]
    write_sample_config: Option<String>,
}

fn parse_bet(raw: &str) -> Result<(BetSpot, u64), String> {
    let (spot, amount) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SPOT=AMOUNT, got '{}'", raw))?;
    let spot = spot.trim().parse::<BetSpot>().map_err(|e| e.to_string())?;
    let amount = amount
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid amount '{}': {}", amount, e))?;
    Ok((spot, amount))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "roulette_table=info".into()),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = &args.write_sample_config {
        generate_sample_config(path)?;
        println!("Sample configuration written to {}", path);
        return Ok(());
    }

    if args.bets.is_empty() {
        return Err("at least one --bet is required".into());
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;
    if args.fast {
        config.round.spin_duration_ms = 0;
        config.round.cooldown_ms = 0;
    }

    let source = match args.seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };
    let wallet = Arc::new(InMemoryWallet::new(args.balance));
    let mut session = TableSession::new(&config, source, wallet.clone());

    info!(
        "Table open: {} round(s), {} bet(s), balance {}",
        args.rounds,
        args.bets.len(),
        args.balance
    );

    for _ in 0..args.rounds {
        for (spot, amount) in &args.bets {
            session.table_mut().place_bet(*spot, *amount)?;
        }

        let Some(outcome) = session.play_round().await else {
            break;
        };

        if args.json {
            println!("{}", serde_json::to_string(&outcome.result)?);
        } else {
            println!("Round {}: {}", outcome.result.round, outcome.result);
        }

        if let Err(e) = &outcome.settlement {
            println!("Settlement failed: {}", e);
            break;
        }
    }

    println!("Final balance: {}", wallet.balance().await?);
    Ok(())
}
