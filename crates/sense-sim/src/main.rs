//! Mob Senses Simulation
//!
//! Runs a seeded population of mobs through the perception engine and
//! writes every perception transition to a JSONL decision log.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use sense_core::{default_config_toml, PerceptionContext};
use sense_events::Transition;
use sense_sim::{build_schedule, create_world, release_all, DecisionLog, SimClock, SimSettings, SpawnConfig};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "sense_sim")]
#[command(about = "Mob perception simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of steps to simulate
    #[arg(long, default_value_t = 1000)]
    steps: u64,

    /// Steps per day/night cycle
    #[arg(long, default_value_t = 400)]
    day_length: u64,

    /// Number of mobs
    #[arg(long, default_value_t = 40)]
    mobs: usize,

    /// Number of players
    #[arg(long, default_value_t = 4)]
    players: usize,

    /// Number of villagers
    #[arg(long, default_value_t = 12)]
    villagers: usize,

    /// Number of livestock
    #[arg(long, default_value_t = 10)]
    livestock: usize,

    /// Perception config file (TOML); built-in defaults when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decision log output path (JSONL)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print the default perception config and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    println!("Mob Senses Simulation");
    println!("=====================");
    println!("Seed: {}", args.seed);
    println!("Steps: {}", args.steps);
    println!();

    let engine = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading perception config");
            PerceptionContext::from_file(path)?
        }
        None => PerceptionContext::new(Default::default())?,
    };
    println!("Profiles: {}", engine.profiles().kinds().collect::<Vec<_>>().join(", "));

    let log = match &args.log {
        Some(path) => DecisionLog::new(path)?,
        None => DecisionLog::null(),
    };

    let settings = SimSettings {
        seed: args.seed,
        day_length: args.day_length,
        spawn: SpawnConfig {
            mobs: args.mobs,
            players: args.players,
            villagers: args.villagers,
            livestock: args.livestock,
        },
    };

    println!("Spawning creatures...");
    let (mut world, summary) = create_world(&settings, engine, log);
    println!(
        "  {} players, {} villagers, {} livestock",
        summary.players, summary.villagers, summary.livestock
    );
    for (kind, count) in &summary.mobs_by_kind {
        println!("  {}: {}", kind, count);
    }
    println!();

    let mut schedule = build_schedule();
    let progress_interval = (args.steps / 10).max(1);
    for _ in 0..args.steps {
        schedule.run(&mut world);

        let step = world.resource::<SimClock>().step;
        if step % progress_interval == 0 {
            let log = world.resource::<DecisionLog>();
            println!("Step {}: {} decisions", step, log.record_count());
        }
    }

    let released = release_all(&mut world);
    info!(released, "stopped perception behaviors");

    let mut log = world.resource_mut::<DecisionLog>();
    log.flush()?;

    println!();
    println!("Simulation complete");
    println!("  Total decisions: {}", log.record_count());
    for transition in [
        Transition::Acquired,
        Transition::Retargeted,
        Transition::Lost,
        Transition::Reached,
        Transition::Yielded,
        Transition::Released,
    ] {
        println!("    {:?}: {}", transition, log.count(transition));
    }
    if let Some(path) = &args.log {
        println!("  Decision log: {}", path.display());
    }

    Ok(())
}
