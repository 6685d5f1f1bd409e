use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use maze_chase_core::{Command, Direction, Event, GameMode, GhostSnapshot, Location};
use maze_chase_world::{self as world, query, PlanningStrategy, World, WorldConfig};

const TICKS: u64 = 480;

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(PlanningStrategy::Parallel);
    let second = replay(PlanningStrategy::Parallel);

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn parallel_planning_matches_sequential_planning() {
    let parallel = replay(PlanningStrategy::Parallel);
    let sequential = replay(PlanningStrategy::Sequential);

    for (tick, (left, right)) in parallel.frames.iter().zip(&sequential.frames).enumerate() {
        assert_eq!(left, right, "ghost state diverged at tick {tick}");
    }
    assert_eq!(parallel, sequential);
}

#[test]
fn replay_reaches_the_super_pellet() {
    let outcome = replay(PlanningStrategy::Parallel);
    assert!(outcome
        .events
        .contains(&Event::GhostsFrightened { cycles: 40 }));
    assert!(outcome.frames.iter().any(|frame| frame.frightened == 4));
}

fn replay(planning: PlanningStrategy) -> ReplayOutcome {
    let config = WorldConfig {
        update_period: 2,
        planning,
        ..WorldConfig::default()
    };
    let mut world = World::new(config).expect("configuration is valid");
    let mut moves = scripted_moves().into_iter();
    let mut frames = Vec::new();
    let mut events = Vec::new();

    for tick in 0..TICKS {
        if tick == 120 {
            world::apply(
                &mut world,
                Command::SetMode {
                    mode: GameMode::Chase,
                },
                &mut events,
            );
        }
        if tick % 2 == 0 {
            if let Some(direction) = moves.next() {
                world::apply(&mut world, Command::MovePlayer { direction }, &mut events);
            }
        }
        world::apply(&mut world, Command::Tick, &mut events);
        frames.push(Frame::capture(&world));
    }

    ReplayOutcome { frames, events }
}

/// Walks from the spawn cell to the lower-left super pellet.
fn scripted_moves() -> Vec<Direction> {
    let legs = [
        (Direction::Left, 7),
        (Direction::Down, 3),
        (Direction::Left, 3),
        (Direction::Up, 3),
        (Direction::Left, 2),
        (Direction::Right, 2),
    ];
    legs.into_iter()
        .flat_map(|(direction, count)| std::iter::repeat(direction).take(count))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    frames: Vec<Frame>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Frame {
    player: Location,
    score: u32,
    pellets: u16,
    frightened: usize,
    ghosts: Vec<GhostSnapshot>,
}

impl Frame {
    fn capture(world: &World) -> Self {
        let ghosts = query::ghost_view(world).into_vec();
        Self {
            player: query::player(world),
            score: query::score(world),
            pellets: query::pellets_remaining(world),
            frightened: ghosts.iter().filter(|ghost| ghost.frightened()).count(),
            ghosts,
        }
    }
}
