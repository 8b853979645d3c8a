#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Mine Defence session.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mine_defence_core::{CellCoord, CellState, Event};
use mine_defence_simulation::Simulation;
use mine_defence_world::query;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Command-line arguments accepted by the headless driver.
#[derive(Debug, Parser)]
#[command(name = "mine-defence", about = "Runs a headless Mine Defence session")]
struct CliArgs {
    /// TOML file describing the grid, thresholds and waves.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Seed overriding the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Grid width overriding the configured one.
    #[arg(long)]
    width: Option<u32>,
    /// Grid height overriding the configured one.
    #[arg(long)]
    height: Option<u32>,
    /// Number of simulated clicks before the session ends.
    #[arg(long, default_value_t = 200)]
    steps: u32,
}

/// Running totals reported when the session ends.
#[derive(Debug, Default)]
struct SessionSummary {
    clicks: u32,
    disclosed: usize,
    hazards_triggered: usize,
    origins: usize,
    enemies: usize,
}

impl SessionSummary {
    fn record(&mut self, events: &[Event]) {
        self.clicks += 1;
        for event in events {
            match event {
                Event::CellDisclosed { .. } => self.disclosed += 1,
                Event::HazardTriggered { .. } => self.hazards_triggered += 1,
                Event::SpawnOriginRegistered { .. } => self.origins += 1,
                Event::EnemySpawned { .. } => self.enemies += 1,
                _ => {}
            }
        }
    }
}

/// Entry point for the Mine Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CliArgs::parse();
    let config = config::load(
        args.config.as_deref(),
        config::Overrides {
            seed: args.seed,
            width: args.width,
            height: args.height,
        },
    )?;

    let mut simulation = Simulation::new(&config).context("failed to build simulation")?;
    println!("{}", query::welcome_banner(simulation.world()));

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut summary = SessionSummary::default();

    for _ in 0..args.steps {
        let Some(cell) = pick_hidden_cell(&simulation, &mut rng) else {
            tracing::info!("every cell has been opened");
            break;
        };
        let events = simulation.primary_action(cell);
        summary.record(&events);
    }

    let world = simulation.world();
    let base = query::base_health(world);
    let (width, height) = query::dimensions(world);
    println!("grid: {width}x{height}");
    println!(
        "clicks: {}, cells disclosed: {}, hazards triggered: {}",
        summary.clicks, summary.disclosed, summary.hazards_triggered
    );
    println!(
        "progress: {:.1}%, spawn origins: {}, waves: {}, enemies spawned: {}",
        query::progress(world) * 100.0,
        summary.origins,
        simulation.spawner().waves(),
        summary.enemies
    );
    println!("base health: {}/{}", base.current(), base.max());

    Ok(())
}

fn pick_hidden_cell(simulation: &Simulation, rng: &mut ChaCha8Rng) -> Option<CellCoord> {
    let hidden: Vec<CellCoord> = query::cells(simulation.world())
        .into_iter()
        .filter(|cell| cell.state == CellState::Hidden)
        .map(|cell| cell.coord)
        .collect();
    hidden.choose(rng).copied()
}
