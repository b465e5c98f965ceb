#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays shooter levels headlessly.

mod autopilot;
mod level_text;
mod session;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use shooter_core::LevelOutcome;
use shooter_world::config::SimulationConfig;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

const DEFAULT_SEED: u64 = 0x5eed;

/// Plays a sequence of text levels with a scripted player.
#[derive(Debug, Parser)]
#[command(name = "shooter", version)]
struct Args {
    /// Level files played in order; the next one loads once a level is cleared.
    #[arg(required = true)]
    levels: Vec<PathBuf>,
    /// TOML file overriding the default simulation tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for every random decision in the run.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Maximum number of ticks simulated per level.
    #[arg(long, default_value_t = 36_000)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long = "dt-ms", default_value_t = 16)]
    dt_ms: u64,
}

/// Entry point for the shooter command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    if args.dt_ms == 0 {
        bail!("--dt-ms must be at least 1");
    }

    let config = load_config(args.config.as_ref())?;
    let mut session = Session::new(config, args.seed);
    let dt = Duration::from_millis(args.dt_ms);

    for path in &args.levels {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read level at {}", path.display()))?;
        let grid = level_text::decode(&contents)
            .with_context(|| format!("failed to decode level at {}", path.display()))?;

        let report = session.play(grid, args.ticks, dt);
        println!(
            "{}: {:?} after {} ticks ({:.2}s), {} shots, {} detonations, {} enemies left",
            path.display(),
            report.outcome,
            report.ticks,
            report.elapsed.as_secs_f32(),
            report.shots,
            report.detonations,
            report.enemies_left,
        );

        if report.outcome != LevelOutcome::Completed {
            tracing::warn!(level = %path.display(), outcome = ?report.outcome, "run stopped");
            return Ok(());
        }
    }

    tracing::info!(levels = args.levels.len(), "all levels cleared");
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse simulation config toml contents")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
