mod app;
mod export;

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{prelude::*, EnvFilter};

use redblue_core::{Game, GameConfig};

/// Line-based front end for the redblue intrusion simulation.
#[derive(Debug, Parser)]
#[command(name = "redblue", version, about)]
struct Args {
    /// Scenario file (JSON `GameConfig`); defaults to the built-in
    /// seven-node corporate network.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed override; pass `random` for a non-reproducible run.
    #[arg(long)]
    seed: Option<String>,

    /// Turn limit override.
    #[arg(long)]
    turn_limit: Option<u32>,

    /// Exfiltration goal override.
    #[arg(long)]
    goal: Option<u32>,

    /// Write the log to this CSV path when the session ends.
    #[arg(long)]
    log_out: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = build_config(&args)?;

    let game = Game::new(config).context("failed to start a run")?;
    let mut app = app::App::new(game, args.log_out);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    app.run(BufReader::new(stdin.lock()), &mut stdout)
}

fn build_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(seed) = &args.seed {
        config.seed = match seed.as_str() {
            "random" => None,
            value => Some(
                value
                    .parse()
                    .with_context(|| format!("invalid seed '{value}'"))?,
            ),
        };
    }
    if let Some(turn_limit) = args.turn_limit {
        config.turn_limit = turn_limit;
    }
    if let Some(goal) = args.goal {
        config.win_exfil = goal;
    }
    Ok(config)
}

fn init_logging() {
    let env_filter = EnvFilter::from_default_env();
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
