//! Scripted stand-in for a human player used by headless runs.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use shooter_core::{EnemyView, PlayerSnapshot};
use shooter_system_player_control::PlayerInput;

/// Chooses pointer and trigger input by chasing the closest enemy.
#[derive(Debug)]
pub(crate) struct Autopilot {
    rng: ChaCha8Rng,
    engage_radius: f32,
    mine_chance: f64,
}

impl Autopilot {
    pub(crate) fn new(seed: u64, engage_radius: f32, mine_chance: f64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            engage_radius,
            mine_chance: mine_chance.clamp(0.0, 1.0),
        }
    }

    /// Points at the nearest enemy and holds the trigger once it is in range.
    pub(crate) fn input(
        &mut self,
        player: Option<&PlayerSnapshot>,
        enemies: &EnemyView,
    ) -> PlayerInput {
        let Some(player) = player else {
            return PlayerInput::default();
        };

        let nearest = enemies
            .iter()
            .map(|enemy| (enemy.position.distance_squared(player.position), enemy.position))
            .min_by(|left, right| left.0.total_cmp(&right.0));
        let Some((distance_squared, target)) = nearest else {
            return PlayerInput::default();
        };

        let in_range = distance_squared < self.engage_radius * self.engage_radius;
        let drop_mine = player.mine_reserve > 0 && self.rng.gen_bool(self.mine_chance);
        PlayerInput::new(Some(target), in_range, drop_mine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shooter_core::{EnemyKind, EnemySnapshot, EntityId, Health};

    fn enemy(id: u32, position: Vec2) -> EnemySnapshot {
        EnemySnapshot {
            id: EntityId::new(id),
            kind: EnemyKind::Mob,
            position,
            rotation: 0.0,
            health: Health::new(10),
            bumped_wall: false,
            waypoint: None,
            last_path_request: None,
            mine_reserve: 0,
        }
    }

    fn player(position: Vec2) -> PlayerSnapshot {
        PlayerSnapshot {
            id: EntityId::new(1),
            position,
            rotation: 0.0,
            health: Health::new(20),
            mine_reserve: 3,
        }
    }

    #[test]
    fn targets_the_closest_enemy() {
        let mut autopilot = Autopilot::new(7, 250.0, 0.0);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(2, Vec2::new(500.0, 100.0)),
            enemy(3, Vec2::new(150.0, 100.0)),
        ]);

        let input = autopilot.input(Some(&player(Vec2::new(100.0, 100.0))), &enemies);

        assert_eq!(input, PlayerInput::new(Some(Vec2::new(150.0, 100.0)), true, false));
    }

    #[test]
    fn holds_fire_until_enemies_are_in_range() {
        let mut autopilot = Autopilot::new(7, 100.0, 0.0);
        let enemies = EnemyView::from_snapshots(vec![enemy(2, Vec2::new(500.0, 100.0))]);

        let input = autopilot.input(Some(&player(Vec2::new(100.0, 100.0))), &enemies);

        assert!(!input.fire_held);
        assert_eq!(input.pointer, Some(Vec2::new(500.0, 100.0)));
    }

    #[test]
    fn idles_without_player_or_enemies() {
        let mut autopilot = Autopilot::new(7, 100.0, 1.0);

        assert_eq!(autopilot.input(None, &EnemyView::default()), PlayerInput::default());
        assert_eq!(
            autopilot.input(Some(&player(Vec2::ZERO)), &EnemyView::default()),
            PlayerInput::default()
        );
    }
}
