#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the shooter simulation.

mod collision;
mod combat;
pub mod config;
mod entities;
pub mod navigation;

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shooter_core::{
    heading_vector, normalize_degrees, CellCoord, Command, EntityId, Event, GridGraph, Health,
    LevelOutcome, Segment, TileGrid, TileKind,
};

use crate::{
    collision::WallMap,
    config::SimulationConfig,
    entities::{Body, BossBody, BulletBody, Combatant, EntityRegistry, MineBody, MinePhase},
};

const DEFAULT_SEED: u64 = 0x5eed_cafe_f00d_0001;

/// Static data of the active level.
#[derive(Debug)]
struct Level {
    grid: TileGrid,
    graph: GridGraph,
    wall_edges: Vec<Segment>,
    bounds: Vec2,
}

/// Represents the authoritative shooter world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    rng: ChaCha8Rng,
    level: Option<Level>,
    registry: EntityRegistry,
    elapsed: Duration,
    outcome: LevelOutcome,
}

impl World {
    /// Creates an idle world that draws mine timers and bullet spread from `seed`.
    #[must_use]
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            level: None,
            registry: EntityRegistry::new(),
            elapsed: Duration::ZERO,
            outcome: LevelOutcome::Idle,
        }
    }

    fn tile_length(&self) -> f32 {
        self.config.tile_length
    }

    fn load_level(&mut self, grid: TileGrid, out_events: &mut Vec<Event>) {
        let tile_length = self.tile_length();
        let graph = navigation::build_graph(&grid);
        let wall_edges = navigation::wall_boundary_edges(&grid, tile_length);
        let bounds = Vec2::new(
            grid.columns() as f32 * tile_length,
            grid.rows() as f32 * tile_length,
        );

        let enemies = grid.count(TileKind::MobSpawn) + grid.count(TileKind::BossSpawn);
        let per_mob = self.config.player.health_per_mob;
        let player_health = Health::new(
            i32::try_from(enemies)
                .unwrap_or(i32::MAX)
                .saturating_mul(per_mob),
        );

        self.registry.reset();
        for (cell, kind) in grid.iter() {
            let center = cell.center(tile_length);
            let _ = match kind {
                TileKind::Empty => continue,
                TileKind::Wall => self.registry.spawn(
                    center,
                    Vec2::ZERO,
                    0.0,
                    Vec2::splat(tile_length),
                    Body::Wall,
                ),
                TileKind::PlayerSpawn => self.registry.spawn(
                    center,
                    Vec2::ZERO,
                    0.0,
                    Vec2::splat(self.config.player.hit_box),
                    Body::Player(Combatant::new(player_health, self.config.player.mine_reserve)),
                ),
                TileKind::MobSpawn => self.registry.spawn(
                    center,
                    Vec2::ZERO,
                    0.0,
                    Vec2::splat(self.config.mob.hit_box),
                    Body::Mob(Combatant::new(
                        Health::new(self.config.mob.health),
                        0,
                    )),
                ),
                TileKind::BossSpawn => self.registry.spawn(
                    center,
                    Vec2::ZERO,
                    0.0,
                    Vec2::splat(self.config.boss.hit_box),
                    Body::Boss(BossBody {
                        combatant: Combatant::new(
                            Health::new(self.config.boss.health),
                            self.config.boss.mine_reserve,
                        ),
                        path: VecDeque::new(),
                        last_path_request: None,
                    }),
                ),
            };
        }

        tracing::info!(
            columns = grid.columns(),
            rows = grid.rows(),
            mobs = enemies,
            player_health = player_health.get(),
            "level loaded"
        );
        out_events.push(Event::LevelLoaded {
            columns: grid.columns(),
            rows: grid.rows(),
            mobs: enemies,
            player_health,
        });

        self.level = Some(Level {
            grid,
            graph,
            wall_edges,
            bounds,
        });

        if enemies == 0 {
            self.outcome = LevelOutcome::Completed;
            out_events.push(Event::LevelCompleted);
        } else {
            self.outcome = LevelOutcome::InProgress;
        }
    }

    fn steer(&mut self, entity: EntityId, rotation: f32, speed: f32) {
        let Some(target) = self.registry.get_mut(entity) else {
            return;
        };
        if !target.is_live() || target.combatant().is_none() || !rotation.is_finite() {
            return;
        }
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        target.rotation = normalize_degrees(rotation);
        target.velocity = heading_vector(target.rotation) * speed;
    }

    fn fire(&mut self, shooter: EntityId, out_events: &mut Vec<Event>) {
        let now = self.elapsed;
        let tuning = &self.config.bullet;
        let Some(entity) = self.registry.get_mut(shooter) else {
            return;
        };
        if !entity.is_live() {
            return;
        }
        let Some(combatant) = entity.combatant_mut() else {
            return;
        };
        if !combatant.try_fire(now, tuning.fire_interval()) {
            return;
        }

        let rotation = entity.rotation;
        let origin = entity.position + heading_vector(rotation) * tuning.barrel_offset;
        let spread = if tuning.spread_degrees > 0 {
            self.rng
                .gen_range(-tuning.spread_degrees..tuning.spread_degrees)
        } else {
            0
        };
        let heading = normalize_degrees(rotation + spread as f32);

        let bullet = self.registry.spawn(
            origin,
            heading_vector(heading) * tuning.speed,
            heading,
            Vec2::splat(tuning.hit_box),
            Body::Bullet(BulletBody {
                spawned_at: now,
                shooter,
            }),
        );
        tracing::trace!(shooter = shooter.get(), bullet = bullet.get(), "shot fired");
        out_events.push(Event::ShotFired { shooter, bullet });
    }

    fn place_mine(&mut self, placer: EntityId, out_events: &mut Vec<Event>) {
        let now = self.elapsed;
        let tuning = &self.config.mine;
        let Some(entity) = self.registry.get_mut(placer) else {
            return;
        };
        if !entity.is_live() {
            return;
        }
        let position = entity.position;
        let Some(combatant) = entity.combatant_mut() else {
            return;
        };
        if !combatant.try_take_mine(now, tuning.placement_interval()) {
            return;
        }

        let (shortest, longest) = tuning.fuse_range_ms();
        let fuse = Duration::from_millis(self.rng.gen_range(shortest..=longest));
        let mine = self.registry.spawn(
            position,
            Vec2::ZERO,
            0.0,
            Vec2::splat(tuning.hit_box),
            Body::Mine(MineBody {
                placed_at: now,
                fuse,
                placer,
                phase: MinePhase::Placed,
            }),
        );
        tracing::debug!(
            placer = placer.get(),
            mine = mine.get(),
            fuse_ms = fuse.as_millis() as u64,
            "mine placed"
        );
        out_events.push(Event::MinePlaced { placer, mine });
    }

    fn assign_path(&mut self, boss: EntityId, path: Vec<CellCoord>, out_events: &mut Vec<Event>) {
        let now = self.elapsed;
        let Some(level) = &self.level else {
            return;
        };
        let Some(entity) = self.registry.get_mut(boss) else {
            return;
        };
        if !entity.is_live() {
            return;
        }
        let Body::Boss(body) = &mut entity.body else {
            return;
        };

        let walkable = path
            .iter()
            .all(|cell| level.graph.contains(*cell) && !level.graph.is_obstacle(*cell));
        body.path = if walkable {
            VecDeque::from(path)
        } else {
            VecDeque::new()
        };
        body.last_path_request = Some(now);
        out_events.push(Event::PathAssigned {
            boss,
            waypoints: body.path.len(),
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        if self.outcome != LevelOutcome::InProgress {
            return;
        }

        self.move_combatants(dt, out_events);
        self.move_bullets(dt);
        combat::resolve_bullet_hits(&mut self.registry, self.config.bullet.damage, out_events);
        combat::update_mines(&mut self.registry, self.elapsed, &self.config.mine, out_events);

        if let Some(player) = combat::update_vitality(
            &mut self.registry,
            self.elapsed,
            &self.config.animation,
            out_events,
        ) {
            tracing::info!(player = player.get(), "player died");
            self.outcome = LevelOutcome::Defeated;
        }

        for (entity, kind) in self.registry.purge() {
            out_events.push(Event::EntityRemoved { entity, kind });
        }

        if self.outcome == LevelOutcome::InProgress && self.registry.mob_count() == 0 {
            tracing::info!(elapsed_ms = self.elapsed.as_millis() as u64, "level completed");
            self.outcome = LevelOutcome::Completed;
            out_events.push(Event::LevelCompleted);
        }
    }

    fn move_combatants(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(level) = &self.level else {
            return;
        };
        let tile_length = self.config.tile_length;
        let arrival = self.config.boss.waypoint_arrival_tiles * tile_length;
        let walls = WallMap::new(&level.grid, tile_length);
        let seconds = dt.as_secs_f32();

        for id in self.registry.combatant_ids() {
            let Some(entity) = self.registry.get_mut(id) else {
                continue;
            };
            if !entity.is_live() {
                continue;
            }

            let mut position = entity.position;
            let mut velocity = entity.velocity;
            let bumped = collision::move_with_walls(
                &mut position,
                &mut velocity,
                entity.size,
                seconds,
                &walls,
            );
            entity.position = position;
            entity.velocity = velocity;
            if let Some(combatant) = entity.combatant_mut() {
                combatant.bumped_wall = bumped;
            }

            if let Body::Boss(boss) = &mut entity.body {
                let reached = boss
                    .path
                    .front()
                    .copied()
                    .filter(|cell| cell.center(tile_length).distance(position) < arrival);
                if let Some(cell) = reached {
                    let _ = boss.path.pop_front();
                    out_events.push(Event::WaypointReached { boss: id, cell });
                }
            }
        }
    }

    fn move_bullets(&mut self, dt: Duration) {
        let Some(level) = &self.level else {
            return;
        };
        let walls = WallMap::new(&level.grid, self.config.tile_length);
        let ttl = self.config.bullet.ttl();
        let seconds = dt.as_secs_f32();
        let now = self.elapsed;

        for id in self.registry.bullet_ids() {
            let Some(entity) = self.registry.get_mut(id) else {
                continue;
            };
            if entity.pending_removal {
                continue;
            }
            let Body::Bullet(bullet) = &entity.body else {
                continue;
            };
            if now.saturating_sub(bullet.spawned_at) >= ttl {
                entity.pending_removal = true;
                continue;
            }

            entity.position += entity.velocity * seconds;
            let inside = entity.position.cmpge(Vec2::ZERO).all()
                && entity.position.cmple(level.bounds).all();
            if !inside || walls.blocks(&entity.hit_box()) {
                entity.pending_removal = true;
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default(), DEFAULT_SEED)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Gameplay commands are ignored unless a level is in progress, and commands
/// naming missing or dead entities are ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { grid } => world.load_level(grid, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::Steer {
            entity,
            rotation,
            speed,
        } => {
            if world.outcome == LevelOutcome::InProgress {
                world.steer(entity, rotation, speed);
            }
        }
        Command::Fire { shooter } => {
            if world.outcome == LevelOutcome::InProgress {
                world.fire(shooter, out_events);
            }
        }
        Command::PlaceMine { placer } => {
            if world.outcome == LevelOutcome::InProgress {
                world.place_mine(placer, out_events);
            }
        }
        Command::AssignPath { boss, path } => {
            if world.outcome == LevelOutcome::InProgress {
                world.assign_path(boss, path, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use shooter_core::{
        EnemyKind, EnemySnapshot, EnemyView, EntityId, EntityPresentation, GridGraph, Health,
        LevelOutcome, PlayerSnapshot, Segment, SpriteFrame, TileGrid,
    };

    use super::World;
    use crate::{
        config::{frame_at, SimulationConfig},
        entities::{Body, Entity, MinePhase, Vitality},
    };

    /// Progress of the active level.
    #[must_use]
    pub fn outcome(world: &World) -> LevelOutcome {
        world.outcome
    }

    /// Total simulated time since the world was created.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }

    /// Side length of a grid cell in world units.
    #[must_use]
    pub fn tile_length(world: &World) -> f32 {
        world.tile_length()
    }

    /// Layout of the active level, if one is loaded.
    #[must_use]
    pub fn tile_grid(world: &World) -> Option<&TileGrid> {
        world.level.as_ref().map(|level| &level.grid)
    }

    /// Passability graph of the active level, if one is loaded.
    #[must_use]
    pub fn grid_graph(world: &World) -> Option<&GridGraph> {
        world.level.as_ref().map(|level| &level.graph)
    }

    /// Wall edges that block sight in the active level.
    #[must_use]
    pub fn wall_edges(world: &World) -> &[Segment] {
        world
            .level
            .as_ref()
            .map(|level| level.wall_edges.as_slice())
            .unwrap_or(&[])
    }

    /// Number of mobs and bosses still present, dying ones included.
    #[must_use]
    pub fn mob_count(world: &World) -> usize {
        world.registry.mob_count()
    }

    /// Captures every live mob and boss in ascending id order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots = world
            .registry
            .mob_ids()
            .into_iter()
            .filter_map(|id| world.registry.get(id))
            .filter(|entity| entity.is_live())
            .filter_map(enemy_snapshot)
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    fn enemy_snapshot(entity: &Entity) -> Option<EnemySnapshot> {
        let (kind, combatant, waypoint, last_path_request) = match &entity.body {
            Body::Mob(combatant) => (EnemyKind::Mob, combatant, None, None),
            Body::Boss(boss) => (
                EnemyKind::Boss,
                &boss.combatant,
                boss.path.front().copied(),
                boss.last_path_request,
            ),
            Body::Player(_) | Body::Bullet(_) | Body::Mine(_) | Body::Wall => return None,
        };
        Some(EnemySnapshot {
            id: entity.id,
            kind,
            position: entity.position,
            rotation: entity.rotation,
            health: combatant.health,
            bumped_wall: combatant.bumped_wall,
            waypoint,
            last_path_request,
            mine_reserve: combatant.mine_reserve,
        })
    }

    /// Captures the player while it is alive.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        let entity = world
            .registry
            .player_id()
            .and_then(|id| world.registry.get(id))
            .filter(|entity| entity.is_live())?;
        let combatant = entity.combatant()?;
        Some(PlayerSnapshot {
            id: entity.id,
            position: entity.position,
            rotation: entity.rotation,
            health: combatant.health,
            mine_reserve: combatant.mine_reserve,
        })
    }

    /// Health of a player, mob or boss that is still present.
    #[must_use]
    pub fn health(world: &World, entity: EntityId) -> Option<Health> {
        world
            .registry
            .get(entity)
            .and_then(Entity::combatant)
            .map(|combatant| combatant.health)
    }

    /// Produces the drawing instructions for every entity in ascending id order.
    #[must_use]
    pub fn render_view(world: &World) -> Vec<EntityPresentation> {
        world
            .registry
            .iter()
            .filter(|entity| !entity.pending_removal)
            .map(|entity| EntityPresentation {
                id: entity.id,
                kind: entity.kind(),
                position: entity.position,
                rotation: entity.rotation,
                frame: sprite_frame(world, entity),
                hit_box: entity.hit_box(),
            })
            .collect()
    }

    fn sprite_frame(world: &World, entity: &Entity) -> SpriteFrame {
        let now = world.elapsed;
        let animation = &world.config.animation;
        let last_frame = |frames: u8| SpriteFrame::Explosion(frames.saturating_sub(1));

        if let Some(combatant) = entity.combatant() {
            return match combatant.vitality {
                Vitality::Alive => SpriteFrame::Body,
                Vitality::Dying { since } => frame_at(
                    now.saturating_sub(since),
                    animation.death_frame_ms,
                    animation.death_frames,
                )
                .map_or(last_frame(animation.death_frames), SpriteFrame::Explosion),
            };
        }

        let Body::Mine(mine) = &entity.body else {
            return SpriteFrame::Body;
        };
        match mine.phase {
            MinePhase::Placed => SpriteFrame::MineIdle,
            MinePhase::Armed => SpriteFrame::MineArmed,
            MinePhase::Warning => {
                let tuning = &world.config.mine;
                let into_warning = now.saturating_sub(mine.warning_start(tuning.warning()));
                let period = u128::from(tuning.flicker_period_ms.max(1));
                if (into_warning.as_millis() / period) % 2 == 0 {
                    SpriteFrame::MineArmed
                } else {
                    SpriteFrame::MineIdle
                }
            }
            MinePhase::Detonated { at } => frame_at(
                now.saturating_sub(at),
                animation.explosion_frame_ms,
                animation.explosion_frames,
            )
            .map_or(last_frame(animation.explosion_frames), SpriteFrame::Explosion),
        }
    }
}
