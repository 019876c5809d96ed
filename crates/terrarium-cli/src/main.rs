//! Terminal driver for the terrarium simulation.

mod telemetry;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use tracing::info;

use terrarium_core::config::SimConfig;
use terrarium_core::types::Ruleset;
use terrarium_world::{Legend, World};

/// Hand-written demonstration map for the basic ruleset.
const DEMO_PLAN: &str = "\
#####################
#       #      o   ##
#                   #
#       o     ##   ##
#    o              #
#           ##      #
#     ##            #
#          o        #
#####################";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a valley and run it until extinction or the turn limit
    Run(RunArgs),
    /// Replay the bouncing-critter map under the basic ruleset
    Demo(DemoArgs),
    /// Print the default configuration as JSON
    DumpConfig,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Interior width of the generated valley
    #[arg(long, value_name = "CELLS")]
    width: Option<usize>,

    /// Interior height of the generated valley
    #[arg(long, value_name = "CELLS")]
    height: Option<usize>,

    /// Number of wall segments scattered across the interior
    #[arg(long, value_name = "COUNT")]
    walls: Option<usize>,

    /// Number of plants scattered across the interior
    #[arg(long, value_name = "COUNT")]
    plants: Option<usize>,

    /// Number of herbivores scattered across the interior
    #[arg(long, value_name = "COUNT")]
    herbivores: Option<usize>,

    /// Seed for the generator and every in-world random draw
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Stop after this many turns even if creatures survive
    #[arg(long, value_name = "TURNS")]
    turns: Option<u64>,

    /// Delay between rendered frames
    #[arg(long, value_name = "MS", default_value_t = 100)]
    interval_ms: u64,

    /// Skip the frame-by-frame redraw and only report the outcome
    #[arg(long)]
    quiet: bool,

    /// Load the configuration from a JSON file before applying flags
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start from a hand-written map instead of generating one
    #[arg(long, value_name = "FILE")]
    plan: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DemoArgs {
    /// Number of turns to replay
    #[arg(long, value_name = "TURNS", default_value_t = 30)]
    turns: u64,

    /// Delay between rendered frames
    #[arg(long, value_name = "MS", default_value_t = 300)]
    interval_ms: u64,
}

fn main() -> Result<()> {
    telemetry::init()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
        Command::Demo(args) => demo(args),
        Command::DumpConfig => dump_config(),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SimConfig::default(),
    };

    if let Some(width) = args.width {
        config.valley.width = width;
    }
    if let Some(height) = args.height {
        config.valley.height = height;
    }
    if let Some(walls) = args.walls {
        config.valley.counts.insert('#', walls);
    }
    if let Some(plants) = args.plants {
        config.valley.counts.insert('*', plants);
    }
    if let Some(herbivores) = args.herbivores {
        config.valley.counts.insert('o', herbivores);
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(turns) = args.turns {
        config.max_turns = turns;
    }

    info!(
        event = "run_start",
        seed = config.seed,
        ruleset = ?config.ruleset,
        "Starting run"
    );

    // A hand-written map takes priority over the generator.
    let world = match &args.plan {
        Some(path) => {
            let plan = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read map from {}", path.display()))?;
            let legend = match config.ruleset {
                Ruleset::Basic => Legend::basic(),
                Ruleset::Lifelike => Legend::lifelike(),
            };
            World::from_plan(&plan, legend, &config)?
        }
        None => World::generate(&config)?,
    };

    run_loop(world, &config, args.interval_ms, args.quiet)
}

fn demo(args: DemoArgs) -> Result<()> {
    let config = SimConfig {
        ruleset: Ruleset::Basic,
        max_turns: args.turns,
        ..SimConfig::default()
    };
    let world = World::from_plan(DEMO_PLAN, Legend::basic(), &config)?;

    run_loop(world, &config, args.interval_ms, false)
}

fn dump_config() -> Result<()> {
    let config = SimConfig::default();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config from {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse config from {}", path.display()))?;

    Ok(config)
}

fn run_loop(mut world: World, config: &SimConfig, interval_ms: u64, quiet: bool) -> Result<()> {
    let mut stdout = io::stdout();

    while world.turn_count() < config.max_turns && world.creature_count() > 0 {
        world.turn();
        if !quiet {
            draw(&mut stdout, &world)?;
            thread::sleep(Duration::from_millis(interval_ms));
        }
    }

    let census = world.census();
    info!(
        event = "run_finished",
        turns = world.turn_count(),
        creatures = census.creatures,
        plants = census.plants,
        "Run finished"
    );
    println!(
        "Finished after {} turns. Creatures: {} / Plants: {}",
        world.turn_count(),
        census.creatures,
        census.plants
    );

    Ok(())
}

fn draw(stdout: &mut io::Stdout, world: &World) -> Result<()> {
    let census = world.census();

    execute!(stdout, Clear(ClearType::All), MoveTo(0, 0))?;
    write!(stdout, "{}", world.render())?;
    writeln!(
        stdout,
        "Creatures: {} / Plants: {}",
        census.creatures, census.plants
    )?;
    stdout.flush()?;

    Ok(())
}
