//! Ghost entities and the per-tick planning algorithm.
//!
//! A ghost's location is double-buffered: planning writes `next_loc` while
//! every other ghost reads only committed `loc` values, and the apply phase
//! copies `next_loc` into `loc`. The status counters and flags are read and
//! written together under one per-ghost lock.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use maze_chase_core::{Direction, GameMode, GhostColor, GhostSnapshot, Location, RandomSource};

use crate::{
    maze::{Maze, GHOST_HOUSE_EXIT},
    targeting::{self, PlanningContext},
};

/// Red's spawn cell doubles as the point spawning ghosts head for.
pub(crate) const RED_SPAWN: Location = spawn_location(GhostColor::Red);

pub(crate) const fn spawn_location(color: GhostColor) -> Location {
    match color {
        GhostColor::Red => Location::new(11, 13, Direction::Left),
        GhostColor::Pink => Location::new(13, 13, Direction::Down),
        GhostColor::Cyan => Location::new(14, 11, Direction::Up),
        GhostColor::Orange => Location::new(14, 15, Direction::Up),
    }
}

/// Fixed scatter corner of each ghost; these lie outside the maze on purpose.
pub(crate) const fn scatter_target(color: GhostColor) -> (i8, i8) {
    match color {
        GhostColor::Red => (-3, 25),
        GhostColor::Pink => (-3, 2),
        GhostColor::Cyan => (31, 27),
        GhostColor::Orange => (31, 0),
    }
}

const fn initial_trapped_cycles(color: GhostColor) -> u8 {
    match color {
        GhostColor::Red => 0,
        GhostColor::Pink => 5,
        GhostColor::Cyan => 16,
        GhostColor::Orange => 32,
    }
}

/// What a single planning pass did for one ghost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlanOutcome {
    /// Not on the board yet; nothing planned.
    Idle,
    /// Trapped; forced to reverse.
    Reversed,
    /// Frightened; picked a random valid direction.
    Wandered,
    /// Picked the valid direction closest to its target.
    Pursued,
    /// No valid direction; the coasted location was left as is.
    Stranded,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct GhostFlags {
    pub(crate) trapped_cycles: u8,
    pub(crate) fright_cycles: u8,
    pub(crate) spawning: bool,
    pub(crate) eaten: bool,
}

#[derive(Debug)]
pub(crate) struct Ghost {
    color: GhostColor,
    loc: Location,
    next_loc: Location,
    scatter_target: (i8, i8),
    flags: RwLock<GhostFlags>,
}

impl Ghost {
    pub(crate) fn new(color: GhostColor) -> Self {
        Self {
            color,
            loc: Location::EMPTY,
            next_loc: spawn_location(color),
            scatter_target: scatter_target(color),
            flags: RwLock::new(GhostFlags {
                trapped_cycles: initial_trapped_cycles(color),
                fright_cycles: 0,
                spawning: true,
                eaten: false,
            }),
        }
    }

    pub(crate) const fn color(&self) -> GhostColor {
        self.color
    }

    pub(crate) const fn location(&self) -> Location {
        self.loc
    }

    pub(crate) const fn next_location(&self) -> Location {
        self.next_loc
    }

    /// Consistent copy of the status block.
    pub(crate) fn flags(&self) -> GhostFlags {
        *self.read_flags()
    }

    /// Frightens the ghost and traps it for one cycle so it turns around.
    pub(crate) fn frighten(&self, cycles: u8) {
        let mut flags = self.write_flags();
        flags.fright_cycles = cycles;
        if flags.trapped_cycles == 0 {
            flags.trapped_cycles = 1;
        }
    }

    /// Sends an eaten ghost back to the house.
    ///
    /// Red returns to pink's spawn cell because its own spawn cell sits
    /// outside the house.
    pub(crate) fn respawn(&mut self) {
        {
            let mut flags = self.write_flags();
            flags.eaten = true;
            flags.spawning = true;
        }

        self.loc = Location::EMPTY;
        self.next_loc = match self.color {
            GhostColor::Red => spawn_location(GhostColor::Pink),
            color => spawn_location(color),
        };
    }

    /// Commits the planned move and advances the status timers.
    pub(crate) fn update(&mut self) {
        {
            let mut flags = self.write_flags();
            if self.loc.collides_with(&RED_SPAWN) {
                flags.spawning = false;
            }
            if flags.eaten {
                flags.eaten = false;
                flags.fright_cycles = 0;
            }
            if flags.fright_cycles > 0 {
                flags.fright_cycles -= 1;
            }
        }

        self.loc.copy_from(&self.next_loc);
    }

    /// Computes `next_loc` from the shared snapshot.
    ///
    /// Writes only this ghost's `next_loc` and trapped counter.
    pub(crate) fn plan(
        &mut self,
        ctx: &PlanningContext<'_>,
        random: &mut dyn RandomSource,
    ) -> PlanOutcome {
        if self.loc.is_empty() {
            return PlanOutcome::Idle;
        }

        self.next_loc.advance_from(&self.loc);

        if self.take_trapped_cycle() {
            self.next_loc.reverse_dir();
            return PlanOutcome::Reversed;
        }

        let (spawning, fright_cycles) = {
            let flags = self.read_flags();
            (flags.spawning, flags.fright_cycles)
        };

        let target = if spawning
            && !self.loc.collides_with(&RED_SPAWN)
            && !self.next_loc.collides_with(&RED_SPAWN)
        {
            Some(targeting::cell(RED_SPAWN.coords()))
        } else {
            match ctx.mode {
                Some(GameMode::Chase) => Some(targeting::chase_target(self.color, ctx)),
                Some(GameMode::Scatter) => Some(targeting::cell(self.scatter_target)),
                Some(GameMode::Paused) | None => None,
            }
        };

        let reversed = self.next_loc.reversed_dir();
        let mut valid = [false; 4];
        let mut dist_sq = [0_i32; 4];
        for (index, direction) in Direction::ALL.into_iter().enumerate() {
            let (row, col) = self.next_loc.neighbor_coords(direction);
            if let Some((target_row, target_col)) = target {
                dist_sq[index] =
                    Maze::dist_sq(i32::from(row), i32::from(col), target_row, target_col);
            }

            let open = !ctx.maze.wall_at(row, col)
                || (spawning && Maze::ghost_house_at(row, col))
                || (spawning && (row, col) == GHOST_HOUSE_EXIT);
            valid[index] = open && direction != reversed;
        }

        let valid_count = valid.iter().filter(|valid| **valid).count();
        if valid_count == 0 {
            return PlanOutcome::Stranded;
        }

        // Still frightened on the next evaluation, so wander.
        if fright_cycles > 1 {
            let pick = random.below(valid_count);
            let chosen = Direction::ALL
                .into_iter()
                .zip(valid)
                .filter_map(|(direction, valid)| valid.then_some(direction))
                .nth(pick);
            if let Some(direction) = chosen {
                self.next_loc.set_direction(direction);
                return PlanOutcome::Wandered;
            }
        }

        let mut best = Direction::Up;
        let mut best_dist_sq = i32::MAX;
        for (index, direction) in Direction::ALL.into_iter().enumerate() {
            if valid[index] && dist_sq[index] < best_dist_sq {
                best = direction;
                best_dist_sq = dist_sq[index];
            }
        }
        self.next_loc.set_direction(best);
        PlanOutcome::Pursued
    }

    pub(crate) fn snapshot(&self) -> GhostSnapshot {
        let flags = self.flags();
        GhostSnapshot {
            color: self.color,
            location: self.loc,
            next_location: self.next_loc,
            fright_cycles: flags.fright_cycles,
            trapped_cycles: flags.trapped_cycles,
            spawning: flags.spawning,
            eaten: flags.eaten,
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, loc: Location) {
        self.loc = loc;
        self.next_loc = loc;
    }

    #[cfg(test)]
    pub(crate) fn set_flags(&self, flags: GhostFlags) {
        *self.write_flags() = flags;
    }

    fn take_trapped_cycle(&self) -> bool {
        let mut flags = self.write_flags();
        if flags.trapped_cycles == 0 {
            return false;
        }
        flags.trapped_cycles -= 1;
        true
    }

    fn read_flags(&self) -> RwLockReadGuard<'_, GhostFlags> {
        self.flags.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_flags(&self) -> RwLockWriteGuard<'_, GhostFlags> {
        self.flags.write().unwrap_or_else(PoisonError::into_inner)
    }
}
