//! Authoritative entity state and the arena that owns it.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    time::Duration,
};

use glam::Vec2;
use shooter_core::{CellCoord, EntityId, EntityKind, Health, HitBox};

/// State shared by every entity stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    /// Identifier allocated by the registry.
    pub(crate) id: EntityId,
    /// Center of the hit-box in world space.
    pub(crate) position: Vec2,
    /// Displacement per second.
    pub(crate) velocity: Vec2,
    /// Facing in degrees, normalised to `[0, 360)`.
    pub(crate) rotation: f32,
    /// Full width and height of the hit-box.
    pub(crate) size: Vec2,
    /// Set once the entity must be purged at the end of the tick.
    pub(crate) pending_removal: bool,
    /// Kind-specific state.
    pub(crate) body: Body,
}

impl Entity {
    pub(crate) fn kind(&self) -> EntityKind {
        match &self.body {
            Body::Player(_) => EntityKind::Player,
            Body::Mob(_) => EntityKind::Mob,
            Body::Boss(_) => EntityKind::Boss,
            Body::Bullet(_) => EntityKind::Bullet,
            Body::Mine(_) => EntityKind::Mine,
            Body::Wall => EntityKind::Wall,
        }
    }

    pub(crate) fn hit_box(&self) -> HitBox {
        HitBox::new(self.position, self.size)
    }

    pub(crate) fn combatant(&self) -> Option<&Combatant> {
        match &self.body {
            Body::Player(combatant) | Body::Mob(combatant) => Some(combatant),
            Body::Boss(boss) => Some(&boss.combatant),
            Body::Bullet(_) | Body::Mine(_) | Body::Wall => None,
        }
    }

    pub(crate) fn combatant_mut(&mut self) -> Option<&mut Combatant> {
        match &mut self.body {
            Body::Player(combatant) | Body::Mob(combatant) => Some(combatant),
            Body::Boss(boss) => Some(&mut boss.combatant),
            Body::Bullet(_) | Body::Mine(_) | Body::Wall => None,
        }
    }

    /// Reports whether the entity still moves, collides and triggers mines.
    ///
    /// Pending entities, dying combatants and exploded mines are inert.
    pub(crate) fn is_live(&self) -> bool {
        if self.pending_removal {
            return false;
        }
        match &self.body {
            Body::Player(combatant) | Body::Mob(combatant) => combatant.is_alive(),
            Body::Boss(boss) => boss.combatant.is_alive(),
            Body::Mine(mine) => !mine.is_detonated(),
            Body::Bullet(_) | Body::Wall => true,
        }
    }
}

/// Kind-specific entity state.
#[derive(Clone, Debug)]
pub(crate) enum Body {
    Player(Combatant),
    Mob(Combatant),
    Boss(BossBody),
    Bullet(BulletBody),
    Mine(MineBody),
    Wall,
}

/// Health, cooldowns and mine supply of anything that fights.
#[derive(Clone, Debug)]
pub(crate) struct Combatant {
    pub(crate) health: Health,
    pub(crate) vitality: Vitality,
    /// Whether wall resolution pushed the combatant back during the last tick.
    pub(crate) bumped_wall: bool,
    pub(crate) mine_reserve: u32,
    last_shot: Option<Duration>,
    last_mine: Option<Duration>,
}

impl Combatant {
    pub(crate) fn new(health: Health, mine_reserve: u32) -> Self {
        Self {
            health,
            vitality: Vitality::Alive,
            bumped_wall: false,
            mine_reserve,
            last_shot: None,
            last_mine: None,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        matches!(self.vitality, Vitality::Alive)
    }

    /// Records a shot when more than `interval` passed since the previous one.
    pub(crate) fn try_fire(&mut self, now: Duration, interval: Duration) -> bool {
        let ready = self
            .last_shot
            .map_or(true, |last| now.saturating_sub(last) > interval);
        if ready {
            self.last_shot = Some(now);
        }
        ready
    }

    /// Consumes one mine charge when the reserve and placement cooldown allow it.
    pub(crate) fn try_take_mine(&mut self, now: Duration, interval: Duration) -> bool {
        if self.mine_reserve == 0 {
            return false;
        }
        let ready = self
            .last_mine
            .map_or(true, |last| now.saturating_sub(last) >= interval);
        if !ready {
            return false;
        }
        self.mine_reserve -= 1;
        self.last_mine = Some(now);
        true
    }

    pub(crate) fn refund_mine(&mut self) {
        self.mine_reserve = self.mine_reserve.saturating_add(1);
    }

    /// Starts the death sequence of a depleted combatant exactly once.
    pub(crate) fn begin_dying(&mut self, now: Duration) -> bool {
        if self.is_alive() && self.health.is_depleted() {
            self.vitality = Vitality::Dying { since: now };
            return true;
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Vitality {
    Alive,
    Dying { since: Duration },
}

/// Boss state: a combatant plus the waypoints it follows.
#[derive(Clone, Debug)]
pub(crate) struct BossBody {
    pub(crate) combatant: Combatant,
    pub(crate) path: VecDeque<CellCoord>,
    pub(crate) last_path_request: Option<Duration>,
}

#[derive(Clone, Debug)]
pub(crate) struct BulletBody {
    pub(crate) spawned_at: Duration,
    /// Bullets never hit the entity that fired them.
    pub(crate) shooter: EntityId,
}

#[derive(Clone, Debug)]
pub(crate) struct MineBody {
    pub(crate) placed_at: Duration,
    /// Delay after placement at which the mine explodes on its own.
    pub(crate) fuse: Duration,
    /// Entity credited with a refund on detonation. May no longer exist.
    pub(crate) placer: EntityId,
    pub(crate) phase: MinePhase,
}

impl MineBody {
    pub(crate) fn is_detonated(&self) -> bool {
        matches!(self.phase, MinePhase::Detonated { .. })
    }

    pub(crate) fn is_triggerable(&self) -> bool {
        matches!(self.phase, MinePhase::Armed | MinePhase::Warning)
    }

    /// Phase dictated by the clock, or `None` once the fuse has run out.
    pub(crate) fn scheduled_phase(
        &self,
        now: Duration,
        arm_delay: Duration,
        warning: Duration,
    ) -> Option<MinePhase> {
        let age = now.saturating_sub(self.placed_at);
        if age >= self.fuse {
            None
        } else if age < arm_delay {
            Some(MinePhase::Placed)
        } else if self.fuse - age <= warning {
            Some(MinePhase::Warning)
        } else {
            Some(MinePhase::Armed)
        }
    }

    /// Moment the warning flicker starts.
    pub(crate) fn warning_start(&self, warning: Duration) -> Duration {
        self.placed_at + self.fuse.saturating_sub(warning)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MinePhase {
    Placed,
    Armed,
    Warning,
    Detonated { at: Duration },
}

/// Arena that stores every entity and hands out identifiers.
///
/// Mobs (bosses included), bullets and mines are additionally tracked in
/// per-kind index sets so resolution phases iterate them in id order.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    next_entity_id: EntityId,
    player: Option<EntityId>,
    mobs: BTreeSet<EntityId>,
    bullets: BTreeSet<EntityId>,
    mines: BTreeSet<EntityId>,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_entity_id: EntityId::new(0),
            player: None,
            mobs: BTreeSet::new(),
            bullets: BTreeSet::new(),
            mines: BTreeSet::new(),
        }
    }

    /// Drops every entity and restarts identifier allocation.
    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Inserts a new entity and indexes it by kind.
    pub(crate) fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        rotation: f32,
        size: Vec2,
        body: Body,
    ) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().saturating_add(1));

        let entity = Entity {
            id,
            position,
            velocity,
            rotation,
            size,
            pending_removal: false,
            body,
        };

        match entity.kind() {
            EntityKind::Player => self.player = Some(id),
            EntityKind::Mob | EntityKind::Boss => {
                let _ = self.mobs.insert(id);
            }
            EntityKind::Bullet => {
                let _ = self.bullets.insert(id);
            }
            EntityKind::Mine => {
                let _ = self.mines.insert(id);
            }
            EntityKind::Wall => {}
        }

        let _ = self.entries.insert(id, entity);
        id
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    /// Iterates every entity in ascending id order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub(crate) fn mob_ids(&self) -> Vec<EntityId> {
        self.mobs.iter().copied().collect()
    }

    pub(crate) fn bullet_ids(&self) -> Vec<EntityId> {
        self.bullets.iter().copied().collect()
    }

    pub(crate) fn mine_ids(&self) -> Vec<EntityId> {
        self.mines.iter().copied().collect()
    }

    /// Player followed by every mob and boss, in id order.
    pub(crate) fn combatant_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.player.into_iter().chain(self.mobs.iter().copied()).collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn mob_count(&self) -> usize {
        self.mobs.len()
    }

    /// Removes every entity flagged for removal, reporting each one in id order.
    pub(crate) fn purge(&mut self) -> Vec<(EntityId, EntityKind)> {
        let doomed: Vec<EntityId> = self
            .entries
            .values()
            .filter(|entity| entity.pending_removal)
            .map(|entity| entity.id)
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for id in doomed {
            let Some(entity) = self.entries.remove(&id) else {
                continue;
            };
            let _ = self.mobs.remove(&id);
            let _ = self.bullets.remove(&id);
            let _ = self.mines.remove(&id);
            if self.player == Some(id) {
                self.player = None;
            }
            removed.push((id, entity.kind()));
        }
        removed
    }
}
