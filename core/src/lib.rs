#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase simulation.
//!
//! This crate defines the message surface that connects adapters and the
//! authoritative world. Adapters submit [`Command`] values describing desired
//! mutations, the world executes those commands via its `apply` entry point,
//! and then broadcasts [`Event`] values describing what happened. Capabilities
//! the world consumes but does not own (randomness and the mode timer) are
//! expressed as the [`RandomSource`] and [`ModeSource`] ports.

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of rows in the maze grid.
pub const MAZE_ROWS: i8 = 31;

/// Number of columns in the maze grid.
pub const MAZE_COLS: i8 = 28;

/// Cardinal headings available to every entity.
///
/// The declaration order is the canonical enumeration order: whenever
/// candidate moves are compared, ties resolve to the earliest direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in canonical enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the heading pointing the opposite way.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Row and column offsets produced by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Parses the `U`/`D`/`L`/`R` shorthand used by scripted move sequences.
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'U' | 'u' => Some(Self::Up),
            'D' | 'd' => Some(Self::Down),
            'L' | 'l' => Some(Self::Left),
            'R' | 'r' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Grid cell plus facing direction of a single entity.
///
/// Every location is either inside the maze bounds or equal to
/// [`Location::EMPTY`], the off-board sentinel used for entities that have
/// not materialized yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    row: i8,
    col: i8,
    direction: Direction,
}

impl Location {
    /// Off-board sentinel marking an entity that is not on the maze.
    pub const EMPTY: Location = Location::new(32, 32, Direction::Up);

    /// Creates a location at the provided cell facing `direction`.
    #[must_use]
    pub const fn new(row: i8, col: i8, direction: Direction) -> Self {
        Self {
            row,
            col,
            direction,
        }
    }

    /// Zero-based row of the occupied cell.
    #[must_use]
    pub const fn row(&self) -> i8 {
        self.row
    }

    /// Zero-based column of the occupied cell.
    #[must_use]
    pub const fn col(&self) -> i8 {
        self.col
    }

    /// Row and column of the occupied cell.
    #[must_use]
    pub const fn coords(&self) -> (i8, i8) {
        (self.row, self.col)
    }

    /// Heading the entity currently faces.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Heading opposite to the current one.
    #[must_use]
    pub const fn reversed_dir(&self) -> Direction {
        self.direction.reversed()
    }

    /// Reports whether this location is the off-board sentinel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.row == Self::EMPTY.row && self.col == Self::EMPTY.col
    }

    /// Cell adjacent to this one in the provided direction.
    #[must_use]
    pub const fn neighbor_coords(&self, direction: Direction) -> (i8, i8) {
        let (d_row, d_col) = direction.delta();
        (
            self.row.saturating_add(d_row),
            self.col.saturating_add(d_col),
        )
    }

    /// Cell `cells` steps ahead along the current heading.
    #[must_use]
    pub const fn ahead_coords(&self, cells: i8) -> (i8, i8) {
        let (d_row, d_col) = self.direction.delta();
        (
            self.row.saturating_add(d_row.saturating_mul(cells)),
            self.col.saturating_add(d_col.saturating_mul(cells)),
        )
    }

    /// Places this location one step ahead of `other`, keeping its heading.
    pub fn advance_from(&mut self, other: &Location) {
        let (row, col) = other.neighbor_coords(other.direction);
        self.row = row;
        self.col = col;
        self.direction = other.direction;
    }

    /// Turns the heading around without moving.
    pub fn reverse_dir(&mut self) {
        self.direction = self.direction.reversed();
    }

    /// Replaces the heading without moving.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Reports whether both locations occupy the same cell.
    #[must_use]
    pub const fn collides_with(&self, other: &Location) -> bool {
        self.row == other.row && self.col == other.col
    }

    /// Overwrites this location with the cell and heading of `other`.
    pub fn copy_from(&mut self, other: &Location) {
        *self = *other;
    }

    /// Moves to the provided cell, keeping the current heading.
    pub fn move_to_coords(&mut self, row: i8, col: i8) {
        self.row = row;
        self.col = col;
    }
}

/// Identity of a ghost, which also determines its chase behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GhostColor {
    /// Targets the player directly.
    Red,
    /// Targets four cells ahead of the player.
    Pink,
    /// Targets the reflection of red through a pivot ahead of the player.
    Cyan,
    /// Targets the player from afar and retreats when close.
    Orange,
}

impl GhostColor {
    /// Every ghost identity in roster order.
    pub const ALL: [GhostColor; 4] = [
        GhostColor::Red,
        GhostColor::Pink,
        GhostColor::Cyan,
        GhostColor::Orange,
    ];

    /// Position of the identity within [`GhostColor::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Pink => 1,
            Self::Cyan => 2,
            Self::Orange => 3,
        }
    }

    /// Lowercase display name of the identity.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Pink => "pink",
            Self::Cyan => "cyan",
            Self::Orange => "orange",
        }
    }
}

/// Global behaviour mode steering ghost target selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Ghosts head for their fixed scatter corners.
    Scatter,
    /// Ghosts pursue identity-specific chase targets.
    Chase,
    /// Targeting is frozen; planning falls back to the last unpaused mode.
    Paused,
}

/// Mode pair polled from the mode timer once per planning phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSnapshot {
    /// Mode currently reported by the timer.
    pub mode: GameMode,
    /// Most recent mode other than [`GameMode::Paused`], if any.
    pub last_unpaused: Option<GameMode>,
}

impl ModeSnapshot {
    /// Mode that drives targeting, substituting the last unpaused mode while paused.
    ///
    /// Returns `None` when paused without any prior mode.
    #[must_use]
    pub fn effective(&self) -> Option<GameMode> {
        match self.mode {
            GameMode::Paused => self
                .last_unpaused
                .filter(|mode| *mode != GameMode::Paused),
            mode => Some(mode),
        }
    }
}

/// Terminal signal exposed to the session layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every pellet has been collected.
    Won,
    /// A ghost caught the player.
    Lost,
}

/// Remaining-pellet thresholds that release a bonus fruit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FruitWave {
    /// Released the first time the first threshold is reached.
    First,
    /// Released the first time the second threshold is reached.
    Second,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the master clock by one tick, running plan and apply on update ticks.
    Tick,
    /// Queues a player move executed in the apply phase of the next update tick.
    MovePlayer {
        /// Requested heading for the player.
        direction: Direction,
    },
    /// Sets the mode reported by the world's bundled mode switch.
    SetMode {
        /// Mode the switch should report.
        mode: GameMode,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Indicates that the master clock advanced.
    TickAdvanced {
        /// Tick index that was just processed.
        tick: u64,
        /// Whether the tick ran the plan and apply phases.
        updated: bool,
    },
    /// Confirms that the player moved between two cells.
    PlayerMoved {
        /// Location before the move.
        from: Location,
        /// Location after the move.
        to: Location,
    },
    /// Reports that a wall blocked the queued player move.
    PlayerBlocked {
        /// Heading the player attempted.
        direction: Direction,
    },
    /// Confirms that a pellet was collected.
    PelletCollected {
        /// Row of the collected pellet.
        row: i8,
        /// Column of the collected pellet.
        col: i8,
        /// Whether the pellet was a super pellet.
        super_pellet: bool,
        /// Pellets left on the board after collection.
        remaining: u16,
    },
    /// Announces that every ghost became frightened.
    GhostsFrightened {
        /// Fright duration assigned to each ghost, in update ticks.
        cycles: u8,
    },
    /// Confirms that the player ate a frightened ghost.
    GhostEaten {
        /// Identity of the eaten ghost.
        ghost: GhostColor,
        /// Points awarded for the ghost.
        points: u32,
    },
    /// Reports that a ghost caught the player.
    PlayerCaught {
        /// Identity of the ghost responsible.
        ghost: GhostColor,
    },
    /// Announces that a bonus fruit should appear.
    FruitSpawned {
        /// Threshold that released the fruit.
        wave: FruitWave,
    },
    /// Reports a ghost that found no valid move and stayed on its coasted cell.
    GhostStranded {
        /// Identity of the affected ghost.
        ghost: GhostColor,
        /// Location the ghost was left on.
        location: Location,
    },
    /// Announces that the final pellet was collected.
    LevelCleared,
    /// Confirms that the bundled mode switch changed modes.
    ModeChanged {
        /// Mode reported after the change.
        mode: GameMode,
    },
}

/// Uniform integer source consumed by frightened ghosts.
pub trait RandomSource: Send {
    /// Draws an integer uniformly from `0..bound`. `bound` is never zero.
    fn below(&mut self, bound: usize) -> usize;
}

impl<R> RandomSource for R
where
    R: RngCore + Send,
{
    fn below(&mut self, bound: usize) -> usize {
        rand::Rng::gen_range(self, 0..bound)
    }
}

/// Read-only port onto the external mode timer.
pub trait ModeSource: Send + Sync {
    /// Captures the current mode together with the last unpaused mode.
    fn snapshot(&self) -> ModeSnapshot;
}

/// Immutable representation of a single ghost's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GhostSnapshot {
    /// Identity of the ghost.
    pub color: GhostColor,
    /// Committed location.
    pub location: Location,
    /// Location planned for the next apply phase.
    pub next_location: Location,
    /// Remaining frightened update ticks.
    pub fright_cycles: u8,
    /// Remaining forced-reversal update ticks.
    pub trapped_cycles: u8,
    /// Whether the ghost is still leaving the ghost house.
    pub spawning: bool,
    /// Whether the ghost was eaten and is returning to the house.
    pub eaten: bool,
}

impl GhostSnapshot {
    /// Reports whether the ghost is vulnerable to the player.
    #[must_use]
    pub const fn frightened(&self) -> bool {
        self.fright_cycles > 0
    }
}

/// Read-only snapshot describing every ghost in the maze.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GhostView {
    snapshots: Vec<GhostSnapshot>,
}

impl GhostView {
    /// Creates a new ghost view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<GhostSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.color);
        Self { snapshots }
    }

    /// Iterator over the captured ghost snapshots in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &GhostSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the ghost with the provided identity.
    #[must_use]
    pub fn get(&self, color: GhostColor) -> Option<&GhostSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.color == color)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<GhostSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, GameMode, Location, ModeSnapshot, RandomSource};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn advance_from_coasts_along_source_heading() {
        let source = Location::new(5, 6, Direction::Left);
        let mut next = Location::new(0, 0, Direction::Up);
        next.advance_from(&source);
        assert_eq!(next, Location::new(5, 5, Direction::Left));
    }

    #[test]
    fn letters_parse_case_insensitively() {
        assert_eq!(Direction::from_letter('u'), Some(Direction::Up));
        assert_eq!(Direction::from_letter('R'), Some(Direction::Right));
        assert_eq!(Direction::from_letter('x'), None);
    }

    #[test]
    fn reverse_dir_turns_around_in_place() {
        let mut location = Location::new(1, 1, Direction::Right);
        location.reverse_dir();
        assert_eq!(location.direction(), Direction::Left);
        assert_eq!(location.coords(), (1, 1));
    }

    #[test]
    fn collision_ignores_heading() {
        let first = Location::new(4, 4, Direction::Up);
        let second = Location::new(4, 4, Direction::Down);
        assert!(first.collides_with(&second));
        assert!(!first.collides_with(&Location::new(4, 5, Direction::Up)));
    }

    #[test]
    fn ahead_coords_projects_along_heading() {
        let location = Location::new(23, 13, Direction::Up);
        assert_eq!(location.ahead_coords(4), (19, 13));
        assert_eq!(location.ahead_coords(0), (23, 13));
    }

    #[test]
    fn empty_sentinel_is_off_board() {
        assert!(Location::EMPTY.is_empty());
        assert!(Location::EMPTY.row() >= super::MAZE_ROWS);
        assert!(!Location::new(1, 1, Direction::Up).is_empty());
    }

    #[test]
    fn paused_mode_falls_back_to_last_unpaused() {
        let paused = ModeSnapshot {
            mode: GameMode::Paused,
            last_unpaused: Some(GameMode::Chase),
        };
        assert_eq!(paused.effective(), Some(GameMode::Chase));

        let never_started = ModeSnapshot {
            mode: GameMode::Paused,
            last_unpaused: None,
        };
        assert_eq!(never_started.effective(), None);
    }

    #[test]
    fn seeded_rng_draws_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for bound in 1..5 {
            for _ in 0..32 {
                assert!(rng.below(bound) < bound);
            }
        }
    }

    #[test]
    fn location_round_trips_through_bincode() {
        let location = Location::new(14, 11, Direction::Up);
        let bytes = bincode::serialize(&location).expect("serialize");
        let restored: Location = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, location);
    }
}
