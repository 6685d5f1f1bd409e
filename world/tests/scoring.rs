use maze_chase_core::{Command, Direction, Event, Location};
use maze_chase_world::{self as world, query, Maze, World, WorldConfig};

fn step(world: &mut World, direction: Direction) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::MovePlayer { direction }, &mut events);
    for _ in 0..query::update_period(world) {
        world::apply(world, Command::Tick, &mut events);
    }
    events
}

#[test]
fn walking_a_corridor_collects_each_pellet_once() {
    let mut world = World::new(WorldConfig::default()).expect("default configuration is valid");

    for _ in 0..7 {
        let _ = step(&mut world, Direction::Left);
    }
    let blocked = step(&mut world, Direction::Left);

    assert!(blocked.contains(&Event::PlayerBlocked {
        direction: Direction::Left
    }));
    assert_eq!(query::player(&world), Location::new(23, 6, Direction::Left));
    assert_eq!(query::score(&world), 70);
    assert_eq!(query::pellets_remaining(&world), 237);
    assert!((6..=12).all(|col| !query::pellet_at(&world, 23, col)));

    for _ in 0..7 {
        let _ = step(&mut world, Direction::Right);
    }
    assert_eq!(query::score(&world), 70);
    assert_eq!(query::pellets_remaining(&world), 237);
}

#[test]
fn clearing_the_last_pellet_wins() {
    let mut rows = vec!["############################"; 31];
    rows[23] = "#######. .  .        #######";
    let maze = Maze::from_rows(&rows).expect("layout is well formed");
    let mut world =
        World::with_maze(WorldConfig::default(), maze).expect("valid configuration");
    assert_eq!(query::pellets_remaining(&world), 3);

    let mut events = Vec::new();
    for _ in 0..6 {
        events.extend(step(&mut world, Direction::Left));
    }

    assert_eq!(query::pellets_remaining(&world), 0);
    assert_eq!(query::score(&world), 30);
    assert!(events.contains(&Event::LevelCleared));
    assert_eq!(
        query::outcome(&world),
        Some(maze_chase_core::Outcome::Won)
    );
}

#[test]
fn out_of_bounds_queries_report_walls_without_pellets() {
    let world = World::new(WorldConfig::default()).expect("default configuration is valid");
    assert!(query::wall_at(&world, -1, 5));
    assert!(query::wall_at(&world, 14, 28));
    assert!(!query::pellet_at(&world, 31, 0));
}
