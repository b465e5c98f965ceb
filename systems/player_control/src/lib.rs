#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure player-control system that translates pointer and trigger input into
//! steering, firing and mine commands.

use glam::Vec2;
use shooter_core::{rotation_towards, snap_heading, Command, Event, PlayerSnapshot};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput {
    /// Pointer position in world space, if the pointer is over the level.
    pub pointer: Option<Vec2>,
    /// Indicates whether the primary trigger is held on this frame.
    pub fire_held: bool,
    /// Indicates whether the mine trigger is held on this frame.
    pub alt_fire_held: bool,
}

impl PlayerInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(pointer: Option<Vec2>, fire_held: bool, alt_fire_held: bool) -> Self {
        Self {
            pointer,
            fire_held,
            alt_fire_held,
        }
    }
}

/// Tuning consumed by the player-control system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerControlConfig {
    /// Forward speed of the player when walking toward the pointer.
    pub speed: f32,
    /// Distance below which the player stands still and aims at the pointer.
    pub aim_radius: f32,
    /// Granularity, in degrees, of walking headings.
    pub heading_step: f32,
}

impl Default for PlayerControlConfig {
    fn default() -> Self {
        Self {
            speed: 500.0,
            aim_radius: 125.0,
            heading_step: 45.0,
        }
    }
}

/// System that emits player commands while a level is being played.
#[derive(Debug, Clone)]
pub struct PlayerControl {
    config: PlayerControlConfig,
    active: bool,
}

impl PlayerControl {
    /// Creates a new player-control system instance.
    #[must_use]
    pub const fn new(config: PlayerControlConfig) -> Self {
        Self {
            config,
            active: false,
        }
    }

    /// Consumes world events and adapter-derived input to emit player commands.
    ///
    /// The system wakes up on `LevelLoaded` and goes idle once the player dies
    /// or the level is completed.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: Option<&PlayerSnapshot>,
        input: PlayerInput,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelLoaded { mobs, .. } => self.active = *mobs > 0,
                Event::PlayerDied { .. } | Event::LevelCompleted => self.active = false,
                _ => {}
            }
        }

        if !self.active {
            return;
        }
        let Some(player) = player else {
            return;
        };

        out.push(self.steer(player, input.pointer));

        if input.fire_held {
            out.push(Command::Fire { shooter: player.id });
        }
        if input.alt_fire_held {
            out.push(Command::PlaceMine { placer: player.id });
        }
    }

    /// Reports whether the system currently forwards input.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    fn steer(&self, player: &PlayerSnapshot, pointer: Option<Vec2>) -> Command {
        let Some(pointer) = pointer else {
            return Command::Steer {
                entity: player.id,
                rotation: player.rotation,
                speed: 0.0,
            };
        };

        let delta = pointer - player.position;
        let facing = rotation_towards(delta);
        let radius = self.config.aim_radius;
        if delta.length_squared() < radius * radius {
            Command::Steer {
                entity: player.id,
                rotation: facing,
                speed: 0.0,
            }
        } else {
            Command::Steer {
                entity: player.id,
                rotation: snap_heading(facing, self.config.heading_step),
                speed: self.config.speed,
            }
        }
    }
}

impl Default for PlayerControl {
    fn default() -> Self {
        Self::new(PlayerControlConfig::default())
    }
}
