#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the shooter simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values.
//! Systems read immutable snapshots such as [`EnemyView`] and respond
//! exclusively with new command batches.

pub mod geometry;
pub mod grid;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use geometry::{
    crosses_any, heading_vector, normalize_degrees, rotation_towards, segments_intersect,
    snap_heading, HitBox, Segment,
};
pub use grid::{CellCoord, GridGraph, LevelError, TileGrid, TileKind};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Activates a level, replacing every entity and rebuilding static geometry.
    LoadLevel {
        /// Validated layout of the level.
        grid: TileGrid,
    },
    /// Advances the simulation clock and runs movement, collision, combat and
    /// cleanup for the elapsed time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Sets the rotation and forward speed of a player, mob or boss.
    Steer {
        /// Entity being steered.
        entity: EntityId,
        /// Rotation to face, in degrees.
        rotation: f32,
        /// Forward speed along the rotation in world units per second.
        speed: f32,
    },
    /// Requests a shot from the entity, subject to its fire-rate cooldown.
    Fire {
        /// Entity pulling the trigger.
        shooter: EntityId,
    },
    /// Requests a mine drop at the entity's position, subject to its reserve.
    PlaceMine {
        /// Entity dropping the mine.
        placer: EntityId,
    },
    /// Replaces the waypoint queue followed by a boss.
    AssignPath {
        /// Boss that follows the path.
        boss: EntityId,
        /// Cells from the boss's cell to its goal, inclusive. Empty clears the path.
        path: Vec<CellCoord>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a level became active.
    LevelLoaded {
        /// Number of columns in the level grid.
        columns: u32,
        /// Number of rows in the level grid.
        rows: u32,
        /// Mobs and bosses spawned by the level.
        mobs: usize,
        /// Starting health assigned to the player.
        player_health: Health,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a shooter spawned a bullet.
    ShotFired {
        /// Entity that fired.
        shooter: EntityId,
        /// Bullet that was created.
        bullet: EntityId,
    },
    /// Confirms that a mine was dropped.
    MinePlaced {
        /// Entity that dropped the mine.
        placer: EntityId,
        /// Mine that was created.
        mine: EntityId,
    },
    /// Confirms that a boss received a new path.
    PathAssigned {
        /// Boss following the path.
        boss: EntityId,
        /// Number of waypoints queued.
        waypoints: usize,
    },
    /// Reports that a boss arrived at the head waypoint of its path.
    WaypointReached {
        /// Boss that arrived.
        boss: EntityId,
        /// Waypoint that was consumed.
        cell: CellCoord,
    },
    /// Reports that an entity lost health.
    EntityDamaged {
        /// Entity that was hit.
        entity: EntityId,
        /// Health removed by the hit.
        damage: u32,
        /// Health left after the hit.
        remaining: Health,
    },
    /// Reports that a mob or boss ran out of health and started its death animation.
    EntityDying {
        /// Entity that is dying.
        entity: EntityId,
    },
    /// Reports that an entity left the simulation.
    EntityRemoved {
        /// Entity that was removed.
        entity: EntityId,
        /// Kind of the removed entity.
        kind: EntityKind,
    },
    /// Reports that a mine finished its inert period.
    MineArmed {
        /// Mine that armed.
        mine: EntityId,
    },
    /// Reports that a mine entered its final warning period.
    MineWarning {
        /// Mine that started flickering.
        mine: EntityId,
    },
    /// Reports that a mine exploded.
    MineDetonated {
        /// Mine that exploded.
        mine: EntityId,
        /// Whether another mine's blast set it off.
        chained: bool,
    },
    /// Reports that a detonation returned a mine charge to its placer.
    MineRefunded {
        /// Entity credited with the charge.
        placer: EntityId,
        /// Mine whose detonation granted the charge.
        mine: EntityId,
    },
    /// Reports that the player ran out of health.
    PlayerDied {
        /// The player entity.
        player: EntityId,
    },
    /// Reports that no mobs remain in the level.
    LevelCompleted,
}

/// Unique identifier assigned to an entity by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Variants of entities owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player-controlled shooter.
    Player,
    /// Basic enemy.
    Mob,
    /// Enemy that additionally follows grid paths and drops mines.
    Boss,
    /// Projectile fired by a shooter.
    Bullet,
    /// Explosive dropped on the floor.
    Mine,
    /// Static wall cell.
    Wall,
}

/// Hit points of a player, mob or boss. May drop below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(i32);

impl Health {
    /// Creates a health value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric health value.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Reports whether the health reached zero or below.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 <= 0
    }

    /// Returns the health after losing `damage` points.
    #[must_use]
    pub const fn damaged(self, damage: u32) -> Self {
        let damage = if damage > i32::MAX as u32 {
            i32::MAX
        } else {
            damage as i32
        };
        Self(self.0.saturating_sub(damage))
    }
}

/// Enemy variants driven by the perception system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Basic enemy.
    Mob,
    /// Path-following enemy.
    Boss,
}

/// Immutable representation of a single live enemy used by systems.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier assigned to the enemy.
    pub id: EntityId,
    /// Variant of the enemy.
    pub kind: EnemyKind,
    /// Center of the enemy in world space.
    pub position: Vec2,
    /// Current rotation in degrees.
    pub rotation: f32,
    /// Remaining health.
    pub health: Health,
    /// Whether the enemy hit a wall during the last tick.
    pub bumped_wall: bool,
    /// Head of the boss's queued path, if any.
    pub waypoint: Option<CellCoord>,
    /// Simulation time of the boss's last path request.
    pub last_path_request: Option<Duration>,
    /// Mines the enemy may still drop.
    pub mine_reserve: u32,
}

/// Read-only snapshot describing every live enemy.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of enemies captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of the live player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Identifier assigned to the player.
    pub id: EntityId,
    /// Center of the player in world space.
    pub position: Vec2,
    /// Current rotation in degrees.
    pub rotation: f32,
    /// Remaining health.
    pub health: Health,
    /// Mines the player may still drop.
    pub mine_reserve: u32,
}

/// Sprite or animation frame the presentation layer should draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteFrame {
    /// Regular body sprite of a player, mob, boss, bullet or wall.
    Body,
    /// Inert mine.
    MineIdle,
    /// Armed mine.
    MineArmed,
    /// Frame of an explosion sequence, starting at zero.
    Explosion(u8),
}

/// Per-entity rendering output produced by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityPresentation {
    /// Identifier of the entity.
    pub id: EntityId,
    /// Variant of the entity.
    pub kind: EntityKind,
    /// Center of the entity in world space.
    pub position: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Frame to draw.
    pub frame: SpriteFrame,
    /// Collision rectangle of the entity.
    pub hit_box: HitBox,
}

/// Progress of the active level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelOutcome {
    /// No level has been loaded.
    Idle,
    /// The level is being played.
    InProgress,
    /// Every mob was eliminated.
    Completed,
    /// The player ran out of health.
    Defeated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn level_identifiers_round_trip_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
        assert_round_trip(&TileKind::BossSpawn);
        assert_round_trip(&EntityId::new(42));
    }

    #[test]
    fn health_saturates_and_reports_depletion() {
        let health = Health::new(2);
        assert!(!health.is_depleted());
        assert_eq!(health.damaged(1), Health::new(1));
        assert!(health.damaged(2).is_depleted());
        assert_eq!(Health::new(i32::MIN + 1).damaged(u32::MAX), Health::new(i32::MIN));
    }

    #[test]
    fn enemy_view_orders_snapshots_by_id() {
        let snapshot = |id| EnemySnapshot {
            id: EntityId::new(id),
            kind: EnemyKind::Mob,
            position: Vec2::ZERO,
            rotation: 0.0,
            health: Health::new(10),
            bumped_wall: false,
            waypoint: None,
            last_path_request: None,
            mine_reserve: 0,
        };
        let view = EnemyView::from_snapshots(vec![snapshot(9), snapshot(2), snapshot(5)]);
        let ids: Vec<u32> = view.iter().map(|enemy| enemy.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
