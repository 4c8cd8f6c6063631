//! Opinion Co-evolution Batch Driver
//!
//! Builds a small-world starting graph, then runs the engine in batches,
//! logging statistics after each one and optionally emitting a JSON snapshot
//! line per batch for an external renderer.

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use coevo_core::output::write_snapshot_line;
use coevo_core::setup::build_initial_graph;
use coevo_core::{Config, SimError, SimulationEngine};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "coevo_sim")]
#[command(about = "Co-evolution of opinions and relationship strength on a graph")]
struct Args {
    /// TOML config file (defaults to ./coevo.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Total number of steps
    #[arg(long)]
    steps: Option<u64>,

    /// Steps between reports
    #[arg(long)]
    batch: Option<u64>,

    /// Number of nodes in the starting graph
    #[arg(long)]
    nodes: Option<usize>,

    /// Opinion topics per node
    #[arg(long)]
    topics: Option<usize>,

    /// Flexibility scaling for opinion updates
    #[arg(long)]
    delta: Option<f64>,

    /// Write one JSON snapshot per batch to stdout
    #[arg(long)]
    json: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };

    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.run.steps = steps;
    }
    if let Some(batch) = args.batch {
        config.run.batch = batch;
    }
    if let Some(nodes) = args.nodes {
        config.topology.nodes = nodes;
    }
    if let Some(topics) = args.topics {
        config.model.n_topics = topics;
    }
    if let Some(delta) = args.delta {
        config.model.delta = Some(delta);
    }

    config.validate()?;
    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.print_default_config {
        print!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    let config = load_config(&args)?;
    tracing::info!(
        seed = config.run.seed,
        steps = config.run.steps,
        batch = config.run.batch,
        nodes = config.topology.nodes,
        topics = config.model.n_topics,
        delta = ?config.model.delta,
        "starting simulation"
    );

    let mut rng = SmallRng::seed_from_u64(config.run.seed);
    let graph = build_initial_graph(&config, &mut rng)?;
    let mut engine = SimulationEngine::new(graph, config.model.clone(), rng)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        write_snapshot_line(&mut out, &engine.snapshot())?;
    }

    let batch = config.run.batch.max(1);
    while engine.step_count() < config.run.steps {
        let remaining = config.run.steps - engine.step_count();
        match engine.run(batch.min(remaining)) {
            Ok(_) => {}
            Err(SimError::EmptyGraph) => {
                tracing::warn!(
                    step = engine.step_count(),
                    "every edge has been pruned, stopping early"
                );
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let stats = engine.stats();
        tracing::info!(
            step = stats.step,
            edges = stats.edge_count,
            isolated = stats.isolated_nodes,
            mean_weight = %format!("{:.3}", stats.weight.mean),
            opinion_spread = %format!(
                "{:.3}",
                stats.opinion.iter().map(|m| m.std_dev).sum::<f64>()
                    / stats.opinion.len().max(1) as f64
            ),
            "batch complete"
        );

        if args.json {
            write_snapshot_line(&mut out, &engine.snapshot())?;
        }
    }
    out.flush()?;

    let totals = engine.totals();
    tracing::info!(
        steps = totals.steps,
        interactions = totals.interactions,
        edges_created = totals.edges_created,
        creations_skipped = totals.creations_skipped,
        edges_pruned = totals.edges_pruned,
        "simulation complete"
    );
    Ok(())
}
