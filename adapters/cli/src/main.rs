#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Maze Chase session.

mod script;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use maze_chase_core::{Command, Event, GameMode, Outcome};
use maze_chase_world::{self as world, query, Maze, PlanningStrategy, World, WorldConfig};
use tracing::info;

use script::MoveScript;

#[derive(Parser, Debug)]
#[command(
    name = "maze-chase",
    version,
    about = "Run a headless Maze Chase session and print a summary"
)]
struct Cli {
    /// TOML file overriding the default world configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Maze layout text file; the classic maze is used when omitted.
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Number of master-clock ticks to simulate.
    #[arg(long, default_value_t = 1200)]
    ticks: u64,
    /// Seed for the ghosts' random streams.
    #[arg(long)]
    seed: Option<u64>,
    /// Master-clock ticks per update tick.
    #[arg(long)]
    update_period: Option<u32>,
    /// Player moves (`U`, `D`, `L`, `R`, optionally prefixed by a repeat count), one per update tick.
    #[arg(long)]
    moves: Option<String>,
    /// Tick at which ghosts switch from scatter to chase.
    #[arg(long)]
    chase_at: Option<u64>,
    /// Plan ghosts one after another instead of in parallel.
    #[arg(long)]
    sequential: bool,
    /// Stop as soon as the level is cleared or the player is caught.
    #[arg(long)]
    stop_on_outcome: bool,
}

/// Entry point for the Maze Chase command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let summary = run(&cli)?;
    println!("{summary}");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn run(cli: &Cli) -> Result<Summary> {
    let config = load_config(cli)?;
    let maze = load_maze(cli.layout.as_deref())?;
    let world = World::with_maze(config, maze).context("world configuration rejected")?;
    let script = match &cli.moves {
        Some(text) => MoveScript::parse(text).context("invalid move script")?,
        None => MoveScript::default(),
    };

    let options = SessionOptions {
        ticks: cli.ticks,
        chase_at: cli.chase_at,
        stop_on_outcome: cli.stop_on_outcome,
    };
    Ok(simulate(world, script, &options))
}

fn load_config(cli: &Cli) -> Result<WorldConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config at {}", path.display()))?;
            parse_config(&contents)
                .with_context(|| format!("invalid config at {}", path.display()))?
        }
        None => WorldConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }
    if let Some(period) = cli.update_period {
        config.update_period = period;
    }
    if cli.sequential {
        config.planning = PlanningStrategy::Sequential;
    }
    Ok(config)
}

fn parse_config(contents: &str) -> Result<WorldConfig> {
    toml::from_str(contents).context("failed to parse world config toml contents")
}

fn load_maze(path: Option<&Path>) -> Result<Maze> {
    let Some(path) = path else {
        return Ok(Maze::classic());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read maze layout at {}", path.display()))?;
    Maze::from_layout(&contents)
        .with_context(|| format!("invalid maze layout at {}", path.display()))
}

#[derive(Clone, Copy, Debug)]
struct SessionOptions {
    ticks: u64,
    chase_at: Option<u64>,
    stop_on_outcome: bool,
}

fn simulate(mut world: World, mut script: MoveScript, options: &SessionOptions) -> Summary {
    let period = u64::from(query::update_period(&world));
    let mut summary = Summary::default();
    let mut events = Vec::new();

    for _ in 0..options.ticks {
        let tick = query::tick(&world);
        if options.chase_at == Some(tick) {
            world::apply(
                &mut world,
                Command::SetMode {
                    mode: GameMode::Chase,
                },
                &mut events,
            );
        }
        if tick % period == 0 {
            if let Some(direction) = script.next_move() {
                world::apply(&mut world, Command::MovePlayer { direction }, &mut events);
            }
        }
        world::apply(&mut world, Command::Tick, &mut events);

        for event in events.drain(..) {
            summary.record(&event);
        }
        if options.stop_on_outcome && query::outcome(&world).is_some() {
            break;
        }
    }

    summary.ticks = query::tick(&world);
    summary.score = query::score(&world);
    summary.pellets_remaining = query::pellets_remaining(&world);
    summary.outcome = query::outcome(&world);
    info!(
        ticks = summary.ticks,
        score = summary.score,
        pellets_remaining = summary.pellets_remaining,
        "session finished"
    );
    summary
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Summary {
    ticks: u64,
    score: u32,
    pellets_remaining: u16,
    pellets_collected: u32,
    ghosts_eaten: u32,
    fruit: u32,
    strandings: u32,
    outcome: Option<Outcome>,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::PelletCollected { .. } => self.pellets_collected += 1,
            Event::GhostEaten { .. } => self.ghosts_eaten += 1,
            Event::FruitSpawned { .. } => self.fruit += 1,
            Event::GhostStranded { .. } => self.strandings += 1,
            _ => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = match self.outcome {
            Some(Outcome::Won) => "won",
            Some(Outcome::Lost) => "lost",
            None => "undecided",
        };
        writeln!(f, "ticks:             {}", self.ticks)?;
        writeln!(f, "score:             {}", self.score)?;
        writeln!(f, "pellets collected: {}", self.pellets_collected)?;
        writeln!(f, "pellets remaining: {}", self.pellets_remaining)?;
        writeln!(f, "ghosts eaten:      {}", self.ghosts_eaten)?;
        writeln!(f, "fruit released:    {}", self.fruit)?;
        writeln!(f, "ghost strandings:  {}", self.strandings)?;
        write!(f, "outcome:           {outcome}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_config_overrides_defaults() {
        let config = parse_config("update_period = 6\nplanning = \"sequential\"\n")
            .expect("config parses");
        assert_eq!(config.update_period, 6);
        assert_eq!(config.planning, PlanningStrategy::Sequential);
        assert_eq!(config.fright_cycles, WorldConfig::default().fright_cycles);
    }

    #[test]
    fn toml_config_rejects_unknown_keys() {
        assert!(parse_config("tick_rate = 3\n").is_err());
    }

    #[test]
    fn flags_override_config_file_values() {
        let cli = Cli::parse_from(["maze-chase", "--seed", "9", "--update-period", "4", "--sequential"]);
        let config = load_config(&cli).expect("config loads");
        assert_eq!(config.rng_seed, 9);
        assert_eq!(config.update_period, 4);
        assert_eq!(config.planning, PlanningStrategy::Sequential);
    }

    #[test]
    fn scripted_moves_collect_pellets() {
        let world = World::new(WorldConfig::default()).expect("default configuration is valid");
        let script = MoveScript::parse("3L").expect("script is valid");
        let options = SessionOptions {
            ticks: 36,
            chase_at: None,
            stop_on_outcome: false,
        };

        let summary = simulate(world, script, &options);

        assert_eq!(summary.ticks, 36);
        assert_eq!(summary.pellets_collected, 3);
        assert_eq!(summary.score, 30);
        assert_eq!(summary.pellets_remaining, 241);
        assert_eq!(summary.outcome, None);
    }
}
