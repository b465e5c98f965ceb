//! Tuning knobs for the shooter simulation.
//!
//! Every table is optional when deserialised; missing keys fall back to the
//! defaults listed on each field. Durations are stored in milliseconds so the
//! values read naturally in TOML files.

use std::time::Duration;

use serde::Deserialize;

/// Complete tuning document for one simulation run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Side length of a grid cell in world units.
    pub tile_length: f32,
    /// Player health, hit-box, movement and mine supply.
    pub player: PlayerTuning,
    /// Basic enemy statistics.
    pub mob: MobTuning,
    /// Path-following enemy statistics.
    pub boss: BossTuning,
    /// Projectile behaviour shared by every shooter.
    pub bullet: BulletTuning,
    /// Mine timers and blast geometry.
    pub mine: MineTuning,
    /// Frame timings of the death and explosion sequences.
    pub animation: AnimationTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tile_length: 32.0,
            player: PlayerTuning::default(),
            mob: MobTuning::default(),
            boss: BossTuning::default(),
            bullet: BulletTuning::default(),
            mine: MineTuning::default(),
            animation: AnimationTuning::default(),
        }
    }
}

/// Player statistics.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Health granted per enemy in the level; the player starts with this times the enemy count.
    pub health_per_mob: i32,
    /// Side length of the square hit-box.
    pub hit_box: f32,
    /// Forward speed in world units per second.
    pub speed: f32,
    /// Pointer distance under which the player stands still and aims instead of walking.
    pub aim_radius: f32,
    /// Heading granularity in degrees while walking.
    pub heading_step: f32,
    /// Mines carried at level start.
    pub mine_reserve: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            health_per_mob: 10,
            hit_box: 40.0,
            speed: 500.0,
            aim_radius: 125.0,
            heading_step: 45.0,
            mine_reserve: 3,
        }
    }
}

/// Basic enemy statistics.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MobTuning {
    /// Starting health.
    pub health: i32,
    /// Side length of the square hit-box.
    pub hit_box: f32,
    /// Wandering speed in world units per second.
    pub speed: f32,
    /// Distance under which a visible player is engaged.
    pub detection_radius: f32,
    /// Heading granularity in degrees while wandering.
    pub heading_step: f32,
    /// Probability of a quarter turn in each direction per decision.
    pub turn_chance: f64,
}

impl Default for MobTuning {
    fn default() -> Self {
        Self {
            health: 10,
            hit_box: 32.0,
            speed: 300.0,
            detection_radius: 250.0,
            heading_step: 45.0,
            turn_chance: 0.025,
        }
    }
}

/// Path-following enemy statistics.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    /// Starting health.
    pub health: i32,
    /// Side length of the square hit-box.
    pub hit_box: f32,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Mines carried at level start.
    pub mine_reserve: u32,
    /// Minimum simulated time between two path searches, in milliseconds.
    pub path_interval_ms: u64,
    /// Weight applied to the path length in the search priority.
    pub path_weight: f32,
    /// Distance to a waypoint, in tiles, under which it counts as reached.
    pub waypoint_arrival_tiles: f32,
}

impl BossTuning {
    /// Minimum simulated time between two path searches.
    #[must_use]
    pub fn path_interval(&self) -> Duration {
        Duration::from_millis(self.path_interval_ms)
    }
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            health: 30,
            hit_box: 32.0,
            speed: 300.0,
            mine_reserve: 3,
            path_interval_ms: 3_000,
            path_weight: 0.1,
            waypoint_arrival_tiles: 0.25,
        }
    }
}

/// Projectile behaviour.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BulletTuning {
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Health removed from the entity a bullet hits.
    pub damage: u32,
    /// Lifetime in milliseconds.
    pub ttl_ms: u64,
    /// Side length of the square hit-box.
    pub hit_box: f32,
    /// Minimum time between two shots of the same shooter, in milliseconds.
    pub fire_interval_ms: u64,
    /// Distance ahead of the shooter's center where bullets appear.
    pub barrel_offset: f32,
    /// Largest spread in whole degrees; each shot deviates by an integer in `[-spread, spread)`.
    pub spread_degrees: i32,
}

impl BulletTuning {
    /// Lifetime of a bullet.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Minimum time between two shots.
    #[must_use]
    pub fn fire_interval(&self) -> Duration {
        Duration::from_millis(self.fire_interval_ms)
    }
}

impl Default for BulletTuning {
    fn default() -> Self {
        Self {
            speed: 1_500.0,
            damage: 1,
            ttl_ms: 2_000,
            hit_box: 6.0,
            fire_interval_ms: 150,
            barrel_offset: 35.0,
            spread_degrees: 1,
        }
    }
}

/// Mine timers and blast geometry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MineTuning {
    /// Time after placement before proximity can trigger the mine, in milliseconds.
    pub arm_delay_ms: u64,
    /// Length of the flickering warning before a timed detonation, in milliseconds.
    pub warning_ms: u64,
    /// Shortest randomized detonation delay, in milliseconds.
    pub min_fuse_ms: u64,
    /// Longest randomized detonation delay, in milliseconds.
    pub max_fuse_ms: u64,
    /// Radius around the mine center in which entities are destroyed.
    pub blast_radius: f32,
    /// Side length of the square trigger hit-box.
    pub hit_box: f32,
    /// Minimum time between two placements by the same entity, in milliseconds.
    pub placement_interval_ms: u64,
    /// Period of the warning flicker, in milliseconds.
    pub flicker_period_ms: u64,
}

impl MineTuning {
    /// Time after placement before proximity can trigger the mine.
    #[must_use]
    pub fn arm_delay(&self) -> Duration {
        Duration::from_millis(self.arm_delay_ms)
    }

    /// Length of the warning period.
    #[must_use]
    pub fn warning(&self) -> Duration {
        Duration::from_millis(self.warning_ms)
    }

    /// Minimum time between two placements.
    #[must_use]
    pub fn placement_interval(&self) -> Duration {
        Duration::from_millis(self.placement_interval_ms)
    }

    /// Inclusive range of detonation delays in milliseconds, ordered low to high.
    #[must_use]
    pub fn fuse_range_ms(&self) -> (u64, u64) {
        if self.min_fuse_ms <= self.max_fuse_ms {
            (self.min_fuse_ms, self.max_fuse_ms)
        } else {
            (self.max_fuse_ms, self.min_fuse_ms)
        }
    }
}

impl Default for MineTuning {
    fn default() -> Self {
        Self {
            arm_delay_ms: 3_000,
            warning_ms: 5_000,
            min_fuse_ms: 20_000,
            max_fuse_ms: 120_000,
            blast_radius: 125.0,
            hit_box: 32.0,
            placement_interval_ms: 1_000,
            flicker_period_ms: 250,
        }
    }
}

/// Frame timings for death and explosion sequences.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationTuning {
    /// Frames played while a combatant dies.
    pub death_frames: u8,
    /// Display time of one death frame, in milliseconds.
    pub death_frame_ms: u64,
    /// Frames played while a mine explodes.
    pub explosion_frames: u8,
    /// Display time of one explosion frame, in milliseconds.
    pub explosion_frame_ms: u64,
}

impl AnimationTuning {
    /// Total length of the death sequence.
    #[must_use]
    pub fn death_duration(&self) -> Duration {
        Duration::from_millis(self.death_frame_ms.saturating_mul(u64::from(self.death_frames)))
    }

    /// Total length of the explosion sequence.
    #[must_use]
    pub fn explosion_duration(&self) -> Duration {
        Duration::from_millis(
            self.explosion_frame_ms
                .saturating_mul(u64::from(self.explosion_frames)),
        )
    }
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self {
            death_frames: 4,
            death_frame_ms: 100,
            explosion_frames: 4,
            explosion_frame_ms: 100,
        }
    }
}

/// Index of the frame shown `elapsed` into a sequence of `frames` frames.
///
/// Returns `None` once the sequence has finished.
pub(crate) fn frame_at(elapsed: Duration, frame_ms: u64, frames: u8) -> Option<u8> {
    if frames == 0 || frame_ms == 0 {
        return None;
    }
    let index = elapsed.as_millis() / u128::from(frame_ms);
    if index >= u128::from(frames) {
        return None;
    }
    u8::try_from(index).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_fall_back_to_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            tile_length = 16.0

            [bullet]
            speed = 900.0

            [mine]
            blast_radius = 80.0
            "#,
        )
        .expect("valid tuning document");

        assert_eq!(config.tile_length, 16.0);
        assert_eq!(config.bullet.speed, 900.0);
        assert_eq!(config.bullet.ttl(), Duration::from_secs(2));
        assert_eq!(config.mine.blast_radius, 80.0);
        assert_eq!(config.mine.arm_delay(), Duration::from_secs(3));
        assert_eq!(config.player, PlayerTuning::default());
    }

    #[test]
    fn empty_document_matches_default() {
        let config: SimulationConfig = toml::from_str("").expect("empty document");
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn inverted_fuse_bounds_are_reordered() {
        let tuning = MineTuning {
            min_fuse_ms: 9,
            max_fuse_ms: 4,
            ..MineTuning::default()
        };
        assert_eq!(tuning.fuse_range_ms(), (4, 9));
    }

    #[test]
    fn frames_advance_until_sequence_ends() {
        assert_eq!(frame_at(Duration::ZERO, 100, 4), Some(0));
        assert_eq!(frame_at(Duration::from_millis(250), 100, 4), Some(2));
        assert_eq!(frame_at(Duration::from_millis(399), 100, 4), Some(3));
        assert_eq!(frame_at(Duration::from_millis(400), 100, 4), None);
        assert_eq!(frame_at(Duration::ZERO, 100, 0), None);
    }
}
