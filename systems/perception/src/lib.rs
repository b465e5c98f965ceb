#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy perception that turns sight checks into steering,
//! firing and boss path commands.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shooter_core::{
    crosses_any, rotation_towards, snap_heading, CellCoord, Command, EnemyKind, EnemySnapshot,
    EnemyView, Event, GridGraph, PlayerSnapshot, Segment,
};
use shooter_system_pathfinding::{Pathfinder, PathfinderConfig};

const DEFAULT_SEED: u64 = 0x0b5e_55ed_5eec_0002;

/// Tuning consumed by the perception system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerceptionConfig {
    /// Distance within which an enemy may notice its target.
    pub detection_radius: f32,
    /// Forward speed of seeking mobs.
    pub mob_speed: f32,
    /// Forward speed of bosses, both seeking and following a path.
    pub boss_speed: f32,
    /// Granularity, in degrees, of the headings enemies wander along.
    pub heading_step: f32,
    /// Probability of a quarter turn to each side per seeking decision.
    pub turn_chance: f64,
    /// Minimum simulated time between two path requests of the same boss.
    pub path_interval: Duration,
    /// Tuning of the boss pathfinder.
    pub pathfinder: PathfinderConfig,
    /// Seed of the generator driving random turns.
    pub seed: u64,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            detection_radius: 250.0,
            mob_speed: 300.0,
            boss_speed: 300.0,
            heading_step: 45.0,
            turn_chance: 0.025,
            path_interval: Duration::from_secs(3),
            pathfinder: PathfinderConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

/// System that decides, once per tick, how every live enemy reacts to its target.
#[derive(Debug)]
pub struct Perception {
    config: PerceptionConfig,
    pathfinder: Pathfinder,
    rng: ChaCha8Rng,
}

impl Perception {
    /// Creates a perception system with the provided tuning.
    #[must_use]
    pub fn new(config: PerceptionConfig) -> Self {
        Self {
            config,
            pathfinder: Pathfinder::new(config.pathfinder),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Tuning the system was created with.
    #[must_use]
    pub fn config(&self) -> PerceptionConfig {
        self.config
    }

    /// Consumes world events and immutable views to emit enemy commands.
    ///
    /// Decisions are only taken after the clock advanced. Enemies are visited in
    /// ascending id order, so the random stream is consumed deterministically.
    #[allow(clippy::too_many_arguments)]
    pub fn handle(
        &mut self,
        events: &[Event],
        enemies: &EnemyView,
        target: Option<&PlayerSnapshot>,
        wall_edges: &[Segment],
        graph: &GridGraph,
        now: Duration,
        tile_length: f32,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for enemy in enemies.iter() {
            if enemy.kind == EnemyKind::Boss
                && self.follow_path(enemy, target, graph, now, tile_length, out)
            {
                continue;
            }

            let visible =
                target.filter(|target| self.can_see(enemy.position, target.position, wall_edges));
            match visible {
                Some(target) => engage(enemy, target, out),
                None => self.seek(enemy, out),
            }
        }
    }

    /// Reports whether `target` lies strictly inside the detection radius of
    /// `origin` with no wall edge crossing the sight line.
    #[must_use]
    pub fn can_see(&self, origin: Vec2, target: Vec2, wall_edges: &[Segment]) -> bool {
        let radius = self.config.detection_radius;
        if origin.distance_squared(target) >= radius * radius {
            return false;
        }
        !crosses_any(&Segment::new(origin, target), wall_edges)
    }

    /// Replans the boss path when due and steers toward the head waypoint.
    ///
    /// Returns `false` when the boss has no waypoint to follow.
    fn follow_path(
        &mut self,
        boss: &EnemySnapshot,
        target: Option<&PlayerSnapshot>,
        graph: &GridGraph,
        now: Duration,
        tile_length: f32,
        out: &mut Vec<Command>,
    ) -> bool {
        let mut waypoint = boss.waypoint;

        if let Some(target) = target {
            if self.replan_due(boss.last_path_request, now) {
                let start = CellCoord::containing(boss.position, tile_length);
                let goal = CellCoord::containing(target.position, tile_length);
                let path = match (start, goal) {
                    (Some(start), Some(goal)) => self.pathfinder.search(graph, start, goal),
                    _ => Vec::new(),
                };
                waypoint = path.first().copied();
                out.push(Command::AssignPath {
                    boss: boss.id,
                    path,
                });
                if boss.mine_reserve > 0 {
                    out.push(Command::PlaceMine { placer: boss.id });
                }
            }
        }

        let Some(cell) = waypoint else {
            return false;
        };

        let delta = cell.center(tile_length) - boss.position;
        if delta.length_squared() <= f32::EPSILON {
            out.push(Command::Steer {
                entity: boss.id,
                rotation: boss.rotation,
                speed: 0.0,
            });
            return true;
        }

        out.push(Command::Steer {
            entity: boss.id,
            rotation: snap_heading(rotation_towards(delta), self.config.heading_step),
            speed: self.config.boss_speed,
        });
        true
    }

    fn replan_due(&self, last_request: Option<Duration>, now: Duration) -> bool {
        last_request.map_or(true, |last| now.saturating_sub(last) >= self.config.path_interval)
    }

    fn seek(&mut self, enemy: &EnemySnapshot, out: &mut Vec<Command>) {
        let mut rotation = enemy.rotation;
        if enemy.bumped_wall {
            rotation += 180.0;
        }

        let chance = self.config.turn_chance.clamp(0.0, 0.5);
        let roll: f64 = self.rng.gen();
        if roll < chance {
            rotation -= 90.0;
        } else if roll >= 1.0 - chance {
            rotation += 90.0;
        }

        let speed = match enemy.kind {
            EnemyKind::Mob => self.config.mob_speed,
            EnemyKind::Boss => self.config.boss_speed,
        };
        out.push(Command::Steer {
            entity: enemy.id,
            rotation: snap_heading(rotation, self.config.heading_step),
            speed,
        });
    }
}

impl Default for Perception {
    fn default() -> Self {
        Self::new(PerceptionConfig::default())
    }
}

fn engage(enemy: &EnemySnapshot, target: &PlayerSnapshot, out: &mut Vec<Command>) {
    out.push(Command::Steer {
        entity: enemy.id,
        rotation: rotation_towards(target.position - enemy.position),
        speed: 0.0,
    });
    out.push(Command::Fire { shooter: enemy.id });
}
