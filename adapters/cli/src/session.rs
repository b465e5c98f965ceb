//! Headless game loop that drives the world and its systems tick by tick.

use std::time::Duration;

use shooter_core::{Command, Event, LevelOutcome, TileGrid};
use shooter_system_pathfinding::PathfinderConfig;
use shooter_system_perception::{Perception, PerceptionConfig};
use shooter_system_player_control::{PlayerControl, PlayerControlConfig};
use shooter_world::{self as world, config::SimulationConfig, query, World};

use crate::autopilot::Autopilot;

/// Chance per tick that the autopilot drops a mine.
const AUTOPILOT_MINE_CHANCE: f64 = 0.002;

/// Summary of one played level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LevelReport {
    pub(crate) outcome: LevelOutcome,
    pub(crate) ticks: u64,
    pub(crate) elapsed: Duration,
    pub(crate) shots: usize,
    pub(crate) detonations: usize,
    pub(crate) enemies_left: usize,
}

/// World plus the systems that feed it commands.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    perception: Perception,
    control: PlayerControl,
    autopilot: Autopilot,
}

impl Session {
    pub(crate) fn new(config: SimulationConfig, seed: u64) -> Self {
        let perception = Perception::new(perception_config(&config, seed));
        let control = PlayerControl::new(player_control_config(&config));
        let autopilot = Autopilot::new(
            seed.rotate_left(17),
            config.mob.detection_radius,
            AUTOPILOT_MINE_CHANCE,
        );
        Self {
            world: World::new(config, seed),
            perception,
            control,
            autopilot,
        }
    }

    /// Loads `grid` and ticks until the level ends or `max_ticks` elapse.
    pub(crate) fn play(&mut self, grid: TileGrid, max_ticks: u64, dt: Duration) -> LevelReport {
        let started = query::elapsed(&self.world);
        let mut pending = Vec::new();
        world::apply(&mut self.world, Command::LoadLevel { grid }, &mut pending);

        let mut report = LevelReport {
            outcome: query::outcome(&self.world),
            ticks: 0,
            elapsed: Duration::ZERO,
            shots: 0,
            detonations: 0,
            enemies_left: query::mob_count(&self.world),
        };

        while report.outcome == LevelOutcome::InProgress && report.ticks < max_ticks {
            pending = self.step(&pending, dt);
            tally(&pending, &mut report);
            report.ticks += 1;
            report.outcome = query::outcome(&self.world);
        }

        report.elapsed = query::elapsed(&self.world).saturating_sub(started);
        report.enemies_left = query::mob_count(&self.world);
        report
    }

    /// Runs one frame: player input, the clock tick, then enemy decisions.
    fn step(&mut self, previous: &[Event], dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();

        let player = query::player(&self.world);
        let input = self
            .autopilot
            .input(player.as_ref(), &query::enemy_view(&self.world));
        let mut commands = Vec::new();
        self.control
            .handle(previous, player.as_ref(), input, &mut commands);
        self.apply_all(commands, &mut events);

        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut tick_events);

        let mut commands = Vec::new();
        if let Some(graph) = query::grid_graph(&self.world) {
            let target = query::player(&self.world);
            self.perception.handle(
                &tick_events,
                &query::enemy_view(&self.world),
                target.as_ref(),
                query::wall_edges(&self.world),
                graph,
                query::elapsed(&self.world),
                query::tile_length(&self.world),
                &mut commands,
            );
        }
        events.append(&mut tick_events);
        self.apply_all(commands, &mut events);

        events
    }

    fn apply_all(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn tally(events: &[Event], report: &mut LevelReport) {
    for event in events {
        match event {
            Event::ShotFired { .. } => report.shots += 1,
            Event::MineDetonated { .. } => report.detonations += 1,
            _ => {}
        }
    }
}

/// Perception tuning derived from the simulation configuration.
pub(crate) fn perception_config(config: &SimulationConfig, seed: u64) -> PerceptionConfig {
    PerceptionConfig {
        detection_radius: config.mob.detection_radius,
        mob_speed: config.mob.speed,
        boss_speed: config.boss.speed,
        heading_step: config.mob.heading_step,
        turn_chance: config.mob.turn_chance,
        path_interval: config.boss.path_interval(),
        pathfinder: PathfinderConfig {
            weight: config.boss.path_weight,
        },
        seed,
    }
}

/// Player-control tuning derived from the simulation configuration.
pub(crate) fn player_control_config(config: &SimulationConfig) -> PlayerControlConfig {
    PlayerControlConfig {
        speed: config.player.speed,
        aim_radius: config.player.aim_radius,
        heading_step: config.player.heading_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level_text;

    #[test]
    fn configs_follow_simulation_tuning() {
        let mut config = SimulationConfig::default();
        config.mob.detection_radius = 300.0;
        config.boss.path_weight = 0.5;
        config.player.aim_radius = 90.0;

        let perception = perception_config(&config, 11);
        let control = player_control_config(&config);

        assert_eq!(perception.detection_radius, 300.0);
        assert_eq!(perception.pathfinder.weight, 0.5);
        assert_eq!(perception.seed, 11);
        assert_eq!(control.aim_radius, 90.0);

        let session = Session::new(config, 11);
        assert_eq!(session.perception.config(), perception);
    }

    #[test]
    fn empty_level_completes_without_ticking() {
        let grid = level_text::decode("111\n1P1\n111").expect("valid level");
        let mut session = Session::new(SimulationConfig::default(), 3);

        let report = session.play(grid, 100, Duration::from_millis(16));

        assert_eq!(report.outcome, LevelOutcome::Completed);
        assert_eq!(report.ticks, 0);
        assert_eq!(report.elapsed, Duration::ZERO);
    }

    #[test]
    fn play_stops_at_the_tick_limit() {
        let layout = "1111111111\n1P.......1\n1111111..1\n1M.......1\n1111111111";
        let grid = level_text::decode(layout).expect("valid level");
        let mut session = Session::new(SimulationConfig::default(), 3);

        let report = session.play(grid, 5, Duration::from_millis(10));

        assert_eq!(report.ticks, 5);
        assert_eq!(report.elapsed, Duration::from_millis(50));
        assert_eq!(report.outcome, LevelOutcome::InProgress);
        assert_eq!(report.enemies_left, 1);
    }

    #[test]
    fn identical_seeds_replay_identically() {
        let layout = "1111111111\n1P...M...1\n1.11..11.1\n1....B...1\n1111111111";
        let mut first = Session::new(SimulationConfig::default(), 42);
        let mut second = Session::new(SimulationConfig::default(), 42);

        let dt = Duration::from_millis(16);

        let a = first.play(level_text::decode(layout).expect("valid level"), 300, dt);
        let b = second.play(level_text::decode(layout).expect("valid level"), 300, dt);

        assert_eq!(a, b);
    }
}
