use std::time::Duration;

use shooter_core::{Command, Event, LevelOutcome, TileGrid, TileKind};
use shooter_system_perception::{Perception, PerceptionConfig};
use shooter_world::{self as world, config::SimulationConfig, query, World};

const SEED: u64 = 0x1234_5678;

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(240);
    let second = replay(240);

    assert_eq!(first.events, second.events, "replay diverged between runs");
    assert_eq!(first.outcome, second.outcome);
    assert!(
        first
            .events
            .iter()
            .any(|event| matches!(event, Event::PathAssigned { .. })),
        "boss never requested a path"
    );
}

#[test]
fn enemies_act_only_while_level_is_in_progress() {
    let mut world = World::new(SimulationConfig::default(), SEED);
    let mut perception = Perception::new(perception_config(world::query::config(&world)));
    let mut log = Vec::new();

    step(&mut world, &mut perception, Duration::from_millis(16), &mut log);

    assert_eq!(query::outcome(&world), LevelOutcome::Idle);
    assert_eq!(
        log,
        vec![Event::TimeAdvanced {
            dt: Duration::from_millis(16)
        }]
    );
}

struct ReplayOutcome {
    events: Vec<Event>,
    outcome: LevelOutcome,
}

fn replay(ticks: usize) -> ReplayOutcome {
    let mut world = World::new(SimulationConfig::default(), SEED);
    let mut perception = Perception::new(perception_config(query::config(&world)));
    let mut log = Vec::new();

    world::apply(
        &mut world,
        Command::LoadLevel { grid: arena() },
        &mut log,
    );

    for _ in 0..ticks {
        step(&mut world, &mut perception, Duration::from_millis(16), &mut log);
        if query::outcome(&world) != LevelOutcome::InProgress {
            break;
        }
    }

    ReplayOutcome {
        events: log,
        outcome: query::outcome(&world),
    }
}

fn step(world: &mut World, perception: &mut Perception, dt: Duration, log: &mut Vec<Event>) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt }, &mut events);

    let mut commands = Vec::new();
    if let Some(graph) = query::grid_graph(world) {
        let player = query::player(world);
        perception.handle(
            &events,
            &query::enemy_view(world),
            player.as_ref(),
            query::wall_edges(world),
            graph,
            query::elapsed(world),
            query::tile_length(world),
            &mut commands,
        );
    }
    log.append(&mut events);

    for command in commands {
        world::apply(world, command, log);
    }
}

fn perception_config(config: &SimulationConfig) -> PerceptionConfig {
    PerceptionConfig {
        detection_radius: config.mob.detection_radius,
        mob_speed: config.mob.speed,
        boss_speed: config.boss.speed,
        heading_step: config.mob.heading_step,
        turn_chance: config.mob.turn_chance,
        path_interval: config.boss.path_interval(),
        seed: SEED,
        ..PerceptionConfig::default()
    }
}

fn arena() -> TileGrid {
    use TileKind::{BossSpawn as B, Empty as E, MobSpawn as M, PlayerSpawn as P, Wall as W};
    TileGrid::from_rows(vec![
        vec![W, W, W, W, W, W, W, W, W, W],
        vec![W, P, E, E, E, E, E, E, M, W],
        vec![W, E, W, W, E, E, W, W, E, W],
        vec![W, E, E, E, E, E, E, E, E, W],
        vec![W, E, W, E, E, W, E, E, B, W],
        vec![W, M, E, E, E, E, E, E, E, W],
        vec![W, W, W, W, W, W, W, W, W, W],
    ])
    .expect("valid arena")
}
