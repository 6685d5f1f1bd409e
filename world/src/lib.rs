#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Maze Chase simulation.
//!
//! The world owns the maze, the player and the four ghosts. Adapters drive it
//! exclusively through [`apply`] and observe it through [`query`]. Every
//! update tick runs a fork-join planning phase, one task per ghost, followed
//! by a serialized apply phase on the calling thread.

mod config;
mod engine;
mod ghost;
mod maze;
mod mode;
mod targeting;

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use maze_chase_core::{
    Command, Direction, Event, FruitWave, GhostColor, Location, ModeSnapshot, ModeSource,
    Outcome, RandomSource,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

pub use config::{ConfigError, PlanningStrategy, WorldConfig};
pub use maze::{LayoutError, Maze, CLASSIC_LAYOUT};
pub use mode::ModeSwitch;

use ghost::Ghost;
use maze::PelletTake;

const PLAYER_SPAWN: Location = Location::new(23, 13, Direction::Right);

/// Odd constant spreading the master seed across ghost streams.
const STREAM_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Clone, Copy, Debug, Default)]
struct FruitFlags {
    first: bool,
    second: bool,
}

/// Represents the authoritative Maze Chase world state.
pub struct World {
    config: WorldConfig,
    maze: Maze,
    player: Location,
    queued_move: Option<Direction>,
    ghosts: [Ghost; 4],
    randomness: [Box<dyn RandomSource>; 4],
    score: Mutex<u32>,
    fruit: Mutex<FruitFlags>,
    modes: Arc<dyn ModeSource>,
    mode_switch: Option<Arc<ModeSwitch>>,
    mode: ModeSnapshot,
    outcome: Option<Outcome>,
    tick: u64,
}

impl World {
    /// Creates a world on the classic maze with a bundled mode switch.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        Self::with_maze(config, Maze::classic())
    }

    /// Creates a world on the provided maze with a bundled mode switch.
    ///
    /// Each ghost draws from its own ChaCha stream derived from
    /// [`WorldConfig::rng_seed`].
    pub fn with_maze(config: WorldConfig, maze: Maze) -> Result<Self, ConfigError> {
        let switch = Arc::new(ModeSwitch::default());
        let randomness = seeded_streams(config.rng_seed);
        let modes: Arc<dyn ModeSource> = switch.clone();
        Self::assemble(config, maze, modes, Some(switch), randomness)
    }

    /// Creates a world wired to externally owned mode and randomness ports.
    ///
    /// `randomness` is indexed by [`GhostColor::index`]. [`Command::SetMode`]
    /// has no effect on such a world; the caller drives `modes` directly.
    pub fn with_ports(
        config: WorldConfig,
        maze: Maze,
        modes: Arc<dyn ModeSource>,
        randomness: [Box<dyn RandomSource>; 4],
    ) -> Result<Self, ConfigError> {
        Self::assemble(config, maze, modes, None, randomness)
    }

    fn assemble(
        config: WorldConfig,
        maze: Maze,
        modes: Arc<dyn ModeSource>,
        mode_switch: Option<Arc<ModeSwitch>>,
        randomness: [Box<dyn RandomSource>; 4],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mode = modes.snapshot();
        Ok(Self {
            config,
            maze,
            player: PLAYER_SPAWN,
            queued_move: None,
            ghosts: GhostColor::ALL.map(Ghost::new),
            randomness,
            score: Mutex::new(0),
            fruit: Mutex::new(FruitFlags::default()),
            modes,
            mode_switch,
            mode,
            outcome: None,
            tick: 0,
        })
    }

    /// Turns the player, then steps forward unless a wall is in the way.
    ///
    /// Collisions are resolved before the step so a ghost sharing the
    /// player's cell is caught even when the step itself is blocked.
    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        self.player.set_direction(direction);
        self.resolve_collisions(out_events);

        let (row, col) = self.player.neighbor_coords(direction);
        if self.maze.wall_at(row, col) {
            out_events.push(Event::PlayerBlocked { direction });
            return;
        }

        let from = self.player;
        self.player.move_to_coords(row, col);
        out_events.push(Event::PlayerMoved {
            from,
            to: self.player,
        });

        self.collect_pellet(out_events);
        self.resolve_collisions(out_events);
    }

    fn collect_pellet(&mut self, out_events: &mut Vec<Event>) {
        let (row, col) = self.player.coords();
        let take = self.maze.take_pellet(row, col);

        if let PelletTake::Taken {
            super_pellet,
            remaining,
        } = take
        {
            let points = if super_pellet {
                self.config.super_pellet_points
            } else {
                self.config.pellet_points
            };
            award(&self.score, points);
            out_events.push(Event::PelletCollected {
                row,
                col,
                super_pellet,
                remaining,
            });

            if super_pellet {
                self.frighten_ghosts(out_events);
            }

            if remaining == 0 {
                info!(score = query::score(self), "level cleared");
                out_events.push(Event::LevelCleared);
                if self.outcome.is_none() {
                    self.outcome = Some(Outcome::Won);
                }
            }
        }

        self.release_fruit(take.remaining(), out_events);
    }

    fn frighten_ghosts(&self, out_events: &mut Vec<Event>) {
        let cycles = self.config.fright_cycles;
        for ghost in &self.ghosts {
            ghost.frighten(cycles);
        }
        debug!(cycles, "super pellet frightened every ghost");
        out_events.push(Event::GhostsFrightened { cycles });
    }

    fn release_fruit(&self, remaining: u16, out_events: &mut Vec<Event>) {
        let [first, second] = self.config.fruit_thresholds;
        let wave = {
            let mut fruit = lock(&self.fruit);
            if remaining == first && !fruit.first {
                fruit.first = true;
                Some(FruitWave::First)
            } else if remaining == second && !fruit.second {
                fruit.second = true;
                Some(FruitWave::Second)
            } else {
                None
            }
        };

        if let Some(wave) = wave {
            info!(?wave, remaining, "fruit released");
            out_events.push(Event::FruitSpawned { wave });
        }
    }

    /// Eats frightened ghosts on the player's cell and reports a catch by any other.
    ///
    /// A catch is reported once; later catches are suppressed while the
    /// outcome is already [`Outcome::Lost`].
    fn resolve_collisions(&mut self, out_events: &mut Vec<Event>) {
        let player = self.player;
        for ghost in &mut self.ghosts {
            if !ghost.location().collides_with(&player) {
                continue;
            }

            let color = ghost.color();
            let flags = ghost.flags();
            if flags.eaten {
                continue;
            }

            if flags.fright_cycles > 0 {
                ghost.respawn();
                let points = self.config.ghost_eat_points;
                award(&self.score, points);
                debug!(ghost = color.name(), points, "ghost eaten");
                out_events.push(Event::GhostEaten {
                    ghost: color,
                    points,
                });
            } else if self.outcome != Some(Outcome::Lost) {
                info!(ghost = color.name(), "player caught");
                out_events.push(Event::PlayerCaught { ghost: color });
                if self.outcome.is_none() {
                    self.outcome = Some(Outcome::Lost);
                }
            }
        }
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("player", &self.player)
            .field("queued_move", &self.queued_move)
            .field("ghosts", &self.ghosts)
            .field("score", &self.score)
            .field("mode", &self.mode)
            .field("outcome", &self.outcome)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

fn seeded_streams(seed: u64) -> [Box<dyn RandomSource>; 4] {
    GhostColor::ALL.map(|color| {
        let stream = (color.index() as u64 + 1).wrapping_mul(STREAM_STRIDE);
        Box::new(ChaCha8Rng::seed_from_u64(seed ^ stream)) as Box<dyn RandomSource>
    })
}

fn award(score: &Mutex<u32>, points: u32) {
    let mut score = lock(score);
    *score = score.saturating_add(points);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.advance_tick(out_events),
        Command::MovePlayer { direction } => {
            world.queued_move = Some(direction);
        }
        Command::SetMode { mode } => match &world.mode_switch {
            Some(switch) => {
                if switch.set(mode) {
                    out_events.push(Event::ModeChanged { mode });
                }
            }
            None => warn!(?mode, "mode change ignored; world uses an external mode source"),
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use maze_chase_core::{GhostView, Location, ModeSnapshot, Outcome};

    use super::{lock, Maze, World};

    /// Points accumulated so far.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        *lock(&world.score)
    }

    /// Pellets still on the board.
    #[must_use]
    pub fn pellets_remaining(world: &World) -> u16 {
        world.maze.pellet_count()
    }

    /// Reports whether a pellet lies on the cell; out-of-bounds cells have none.
    #[must_use]
    pub fn pellet_at(world: &World, row: i8, col: i8) -> bool {
        world.maze.pellet_at(row, col)
    }

    /// Reports whether the cell is a wall; out-of-bounds cells always are.
    #[must_use]
    pub fn wall_at(world: &World, row: i8, col: i8) -> bool {
        world.maze.wall_at(row, col)
    }

    /// Read-only access to the maze geometry.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// Current player location and heading.
    #[must_use]
    pub fn player(world: &World) -> Location {
        world.player
    }

    /// Captures a read-only view of the ghosts.
    #[must_use]
    pub fn ghost_view(world: &World) -> GhostView {
        GhostView::from_snapshots(world.ghosts.iter().map(|ghost| ghost.snapshot()).collect())
    }

    /// Mode pair observed by the most recent planning phase.
    #[must_use]
    pub fn mode(world: &World) -> ModeSnapshot {
        world.mode
    }

    /// Terminal signal, once the level is cleared or the player is caught.
    #[must_use]
    pub fn outcome(world: &World) -> Option<Outcome> {
        world.outcome
    }

    /// Index of the next tick to be processed.
    #[must_use]
    pub fn tick(world: &World) -> u64 {
        world.tick
    }

    /// Master-clock ticks per update tick.
    #[must_use]
    pub fn update_period(world: &World) -> u32 {
        world.config.update_period
    }
}
