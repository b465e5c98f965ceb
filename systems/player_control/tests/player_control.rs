use glam::Vec2;
use shooter_core::{Command, EntityId, Event, Health, PlayerSnapshot};
use shooter_system_player_control::{PlayerControl, PlayerInput};

fn level_loaded(mobs: usize) -> Event {
    Event::LevelLoaded {
        columns: 10,
        rows: 8,
        mobs,
        player_health: Health::new(10 * mobs as i32),
    }
}

fn player() -> PlayerSnapshot {
    PlayerSnapshot {
        id: EntityId::new(3),
        position: Vec2::new(100.0, 100.0),
        rotation: 180.0,
        health: Health::new(20),
        mine_reserve: 3,
    }
}

fn active_control() -> PlayerControl {
    let mut control = PlayerControl::default();
    let mut commands = Vec::new();
    control.handle(&[level_loaded(2)], None, PlayerInput::default(), &mut commands);
    assert!(control.is_active());
    control
}

#[test]
fn input_is_ignored_before_a_level_loads() {
    let mut control = PlayerControl::default();
    let mut commands = Vec::new();

    control.handle(
        &[],
        Some(&player()),
        PlayerInput::new(Some(Vec2::new(400.0, 100.0)), true, true),
        &mut commands,
    );

    assert!(commands.is_empty(), "idle control must not emit commands");
}

#[test]
fn pointer_inside_aim_radius_turns_without_moving() {
    let mut control = active_control();
    let mut commands = Vec::new();

    control.handle(
        &[],
        Some(&player()),
        PlayerInput::new(Some(Vec2::new(200.0, 100.0)), false, false),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::Steer {
            entity: EntityId::new(3),
            rotation: 0.0,
            speed: 0.0,
        }],
        "player should aim at a close pointer and stand still",
    );
}

#[test]
fn distant_pointer_walks_on_snapped_heading() {
    let mut control = active_control();
    let mut commands = Vec::new();

    control.handle(
        &[],
        Some(&player()),
        PlayerInput::new(Some(Vec2::new(400.0, -190.0)), false, false),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::Steer {
            entity: EntityId::new(3),
            rotation: 45.0,
            speed: 500.0,
        }],
        "player should walk toward a distant pointer on a 45 degree heading",
    );
}

#[test]
fn triggers_request_shots_and_mines() {
    let mut control = active_control();
    let mut commands = Vec::new();

    control.handle(
        &[],
        Some(&player()),
        PlayerInput::new(None, true, true),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::Steer {
                entity: EntityId::new(3),
                rotation: 180.0,
                speed: 0.0,
            },
            Command::Fire {
                shooter: EntityId::new(3),
            },
            Command::PlaceMine {
                placer: EntityId::new(3),
            },
        ],
    );
}

#[test]
fn control_goes_idle_after_player_death() {
    let mut control = active_control();
    let mut commands = Vec::new();

    control.handle(
        &[Event::PlayerDied {
            player: EntityId::new(3),
        }],
        Some(&player()),
        PlayerInput::new(None, true, false),
        &mut commands,
    );

    assert!(!control.is_active());
    assert!(commands.is_empty());
}

#[test]
fn empty_levels_never_activate_control() {
    let mut control = PlayerControl::default();
    let mut commands = Vec::new();

    control.handle(
        &[level_loaded(0), Event::LevelCompleted],
        Some(&player()),
        PlayerInput::new(None, true, false),
        &mut commands,
    );

    assert!(!control.is_active());
    assert!(commands.is_empty());
}
