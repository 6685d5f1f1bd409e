//! Read-only planning inputs and the identity-specific chase targets.

use maze_chase_core::{GameMode, GhostColor, Location};

use crate::{ghost, maze::Maze};

/// Squared distance at which orange stops chasing and retreats to its corner.
const ORANGE_RETREAT_DIST_SQ: i32 = 64;

/// Snapshot every ghost plans against during one update tick.
///
/// Built once before the planning tasks fork and never mutated while they run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlanningContext<'a> {
    pub(crate) maze: &'a Maze,
    pub(crate) player: Location,
    pub(crate) ghosts: [Location; 4],
    pub(crate) mode: Option<GameMode>,
}

impl PlanningContext<'_> {
    fn ghost(&self, color: GhostColor) -> Location {
        self.ghosts[color.index()]
    }
}

/// Cell the ghost pursues while the effective mode is chase.
pub(crate) fn chase_target(color: GhostColor, ctx: &PlanningContext<'_>) -> (i32, i32) {
    let player = cell(ctx.player.coords());
    match color {
        GhostColor::Red => player,
        GhostColor::Pink => cell(ctx.player.ahead_coords(4)),
        GhostColor::Cyan => {
            let (pivot_row, pivot_col) = cell(ctx.player.ahead_coords(2));
            let (red_row, red_col) = cell(ctx.ghost(GhostColor::Red).coords());
            (2 * pivot_row - red_row, 2 * pivot_col - red_col)
        }
        GhostColor::Orange => {
            let (orange_row, orange_col) = cell(ctx.ghost(GhostColor::Orange).coords());
            if Maze::dist_sq(orange_row, orange_col, player.0, player.1) >= ORANGE_RETREAT_DIST_SQ {
                player
            } else {
                cell(ghost::scatter_target(GhostColor::Orange))
            }
        }
    }
}

pub(crate) fn cell((row, col): (i8, i8)) -> (i32, i32) {
    (i32::from(row), i32::from(col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::Direction;

    fn context(maze: &Maze, player: Location, red: Location, orange: Location) -> PlanningContext<'_> {
        PlanningContext {
            maze,
            player,
            ghosts: [red, Location::EMPTY, Location::EMPTY, orange],
            mode: Some(GameMode::Chase),
        }
    }

    #[test]
    fn red_and_pink_track_the_player() {
        let maze = Maze::classic();
        let player = Location::new(23, 13, Direction::Left);
        let ctx = context(&maze, player, Location::EMPTY, Location::EMPTY);
        assert_eq!(chase_target(GhostColor::Red, &ctx), (23, 13));
        assert_eq!(chase_target(GhostColor::Pink, &ctx), (23, 9));
    }

    #[test]
    fn cyan_reflects_red_through_pivot() {
        let maze = Maze::classic();
        let player = Location::new(20, 10, Direction::Up);
        let red = Location::new(14, 6, Direction::Right);
        let ctx = context(&maze, player, red, Location::EMPTY);
        // Pivot is (18, 10); reflection of (14, 6) is (22, 14).
        assert_eq!(chase_target(GhostColor::Cyan, &ctx), (22, 14));
    }

    #[test]
    fn orange_retreats_inside_radius_eight() {
        let maze = Maze::classic();
        let player = Location::new(20, 10, Direction::Up);

        let far = context(&maze, player, Location::EMPTY, Location::new(20, 2, Direction::Up));
        assert_eq!(chase_target(GhostColor::Orange, &far), (20, 10));

        let near = context(&maze, player, Location::EMPTY, Location::new(20, 3, Direction::Up));
        assert_eq!(
            chase_target(GhostColor::Orange, &near),
            cell(ghost::scatter_target(GhostColor::Orange))
        );
    }
}
