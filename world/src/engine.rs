//! Tick scheduling: fork-join ghost planning followed by the serialized apply phase.

use maze_chase_core::{Event, RandomSource};
use rayon::prelude::*;
use tracing::{trace, warn};

use crate::{
    config::PlanningStrategy,
    ghost::{Ghost, PlanOutcome},
    targeting::PlanningContext,
    World,
};

impl World {
    /// Reports whether the current tick runs planning and apply.
    pub(crate) fn update_ready(&self) -> bool {
        self.tick % u64::from(self.config.update_period) == 0
    }

    /// Processes one master-clock tick.
    ///
    /// Apply never starts before every planning task has returned, and the
    /// next tick cannot start planning before apply is done.
    pub(crate) fn advance_tick(&mut self, out_events: &mut Vec<Event>) {
        let tick = self.tick;
        let updated = self.update_ready();
        out_events.push(Event::TickAdvanced { tick, updated });

        if updated {
            self.mode = self.modes.snapshot();
            self.plan_phase(out_events);

            if let Some(direction) = self.queued_move.take() {
                self.move_player(direction, out_events);
            }
            for ghost in &mut self.ghosts {
                ghost.update();
            }
            self.resolve_collisions(out_events);
        }

        self.tick = self.tick.saturating_add(1);
    }

    fn plan_phase(&mut self, out_events: &mut Vec<Event>) {
        let ctx = PlanningContext {
            maze: &self.maze,
            player: self.player,
            ghosts: std::array::from_fn(|index| self.ghosts[index].location()),
            mode: self.mode.effective(),
        };

        let outcomes = plan_ghosts(
            &mut self.ghosts,
            &mut self.randomness,
            &ctx,
            self.config.planning,
        );
        trace!(tick = self.tick, ?outcomes, "ghosts planned");

        for (ghost, outcome) in self.ghosts.iter().zip(outcomes) {
            if outcome != PlanOutcome::Stranded {
                continue;
            }
            let location = ghost.next_location();
            warn!(
                ghost = ghost.color().name(),
                row = location.row(),
                col = location.col(),
                "ghost has no valid move"
            );
            out_events.push(Event::GhostStranded {
                ghost: ghost.color(),
                location,
            });
        }
    }
}

/// Plans every ghost against the same read-only context.
///
/// Each ghost owns its random stream, so both strategies produce identical
/// planned locations.
fn plan_ghosts(
    ghosts: &mut [Ghost; 4],
    randomness: &mut [Box<dyn RandomSource>; 4],
    ctx: &PlanningContext<'_>,
    strategy: PlanningStrategy,
) -> [PlanOutcome; 4] {
    let mut outcomes = [PlanOutcome::Idle; 4];
    match strategy {
        PlanningStrategy::Parallel => {
            ghosts
                .par_iter_mut()
                .zip(randomness.par_iter_mut())
                .zip(outcomes.par_iter_mut())
                .with_max_len(1)
                .for_each(|((ghost, random), outcome)| {
                    *outcome = ghost.plan(ctx, &mut **random);
                });
        }
        PlanningStrategy::Sequential => {
            for ((ghost, random), outcome) in ghosts
                .iter_mut()
                .zip(randomness.iter_mut())
                .zip(outcomes.iter_mut())
            {
                *outcome = ghost.plan(ctx, &mut **random);
            }
        }
    }
    outcomes
}
