//! Combat resolution: bullet hits, mine detonations and death transitions.

use std::time::Duration;

use glam::Vec2;
use shooter_core::{EntityId, EntityKind, Event, Health, HitBox};

use crate::{
    config::{AnimationTuning, MineTuning},
    entities::{Body, Entity, EntityRegistry, MineBody, MinePhase, Vitality},
};

/// Resolves bullet hits against every mob and boss, then against the player.
///
/// Each overlapping bullet is consumed and deals `damage`. Several bullets
/// hitting the same target in one tick all count, and a consumed bullet is
/// never matched again.
pub(crate) fn resolve_bullet_hits(
    registry: &mut EntityRegistry,
    damage: u32,
    out_events: &mut Vec<Event>,
) {
    let mut targets = registry.mob_ids();
    targets.extend(registry.player_id());

    for target in targets {
        hit_target(registry, target, damage, out_events);
    }
}

fn hit_target(
    registry: &mut EntityRegistry,
    target: EntityId,
    damage: u32,
    out_events: &mut Vec<Event>,
) {
    let Some(target_box) = registry
        .get(target)
        .filter(|entity| entity.is_live())
        .map(Entity::hit_box)
    else {
        return;
    };

    let hits: Vec<EntityId> = registry
        .bullet_ids()
        .into_iter()
        .filter(|id| {
            registry
                .get(*id)
                .is_some_and(|bullet| strikes(bullet, target, &target_box))
        })
        .collect();

    for bullet in hits {
        if let Some(entity) = registry.get_mut(bullet) {
            entity.pending_removal = true;
        }
        let Some(combatant) = registry.get_mut(target).and_then(Entity::combatant_mut) else {
            return;
        };
        combatant.health = combatant.health.damaged(damage);
        out_events.push(Event::EntityDamaged {
            entity: target,
            damage,
            remaining: combatant.health,
        });
    }
}

fn strikes(bullet: &Entity, target: EntityId, target_box: &HitBox) -> bool {
    let Body::Bullet(body) = &bullet.body else {
        return false;
    };
    bullet.is_live() && body.shooter != target && bullet.hit_box().overlaps(target_box)
}

/// Advances mine timers, fires proximity triggers and runs timed detonations.
pub(crate) fn update_mines(
    registry: &mut EntityRegistry,
    now: Duration,
    tuning: &MineTuning,
    out_events: &mut Vec<Event>,
) {
    for mine_id in registry.mine_ids() {
        let Some(entity) = registry.get_mut(mine_id) else {
            continue;
        };
        if entity.pending_removal {
            continue;
        }
        let trigger_box = entity.hit_box();
        let Body::Mine(mine) = &mut entity.body else {
            continue;
        };
        if mine.is_detonated() {
            continue;
        }

        let Some(phase) = mine.scheduled_phase(now, tuning.arm_delay(), tuning.warning()) else {
            detonate(registry, mine_id, now, tuning, out_events);
            continue;
        };
        advance_phase(mine_id, mine, phase, out_events);

        if mine.is_triggerable() && is_crowded(registry, mine_id, &trigger_box) {
            detonate(registry, mine_id, now, tuning, out_events);
        }
    }
}

fn advance_phase(mine_id: EntityId, mine: &mut MineBody, phase: MinePhase, out_events: &mut Vec<Event>) {
    if mine.phase == phase {
        return;
    }
    if mine.phase == MinePhase::Placed {
        out_events.push(Event::MineArmed { mine: mine_id });
    }
    if phase == MinePhase::Warning {
        out_events.push(Event::MineWarning { mine: mine_id });
    }
    mine.phase = phase;
}

/// Reports whether any other live, non-wall entity overlaps the mine.
fn is_crowded(registry: &EntityRegistry, mine_id: EntityId, trigger_box: &HitBox) -> bool {
    registry.iter().any(|other| {
        other.id != mine_id
            && other.kind() != EntityKind::Wall
            && other.is_live()
            && other.hit_box().overlaps(trigger_box)
    })
}

/// Detonates a mine and every mine its blast reaches, within the same step.
///
/// Live entities inside the blast radius are killed: combatants drop to zero
/// health and bullets are removed. Other mines in range join the worklist and
/// detonate in turn; a mine that already exploded is never revisited, so
/// mutually overlapping blasts terminate. Each detonation refunds a mine
/// charge to its placer when the placer is still present.
pub(crate) fn detonate(
    registry: &mut EntityRegistry,
    origin: EntityId,
    now: Duration,
    tuning: &MineTuning,
    out_events: &mut Vec<Event>,
) {
    let reach = tuning.blast_radius * tuning.blast_radius;
    let mut worklist = vec![(origin, false)];

    while let Some((mine_id, chained)) = worklist.pop() {
        let Some(entity) = registry.get_mut(mine_id) else {
            continue;
        };
        if entity.pending_removal {
            continue;
        }
        let center = entity.position;
        let Body::Mine(mine) = &mut entity.body else {
            continue;
        };
        if mine.is_detonated() {
            continue;
        }
        mine.phase = MinePhase::Detonated { at: now };
        let placer = mine.placer;

        out_events.push(Event::MineDetonated {
            mine: mine_id,
            chained,
        });
        tracing::debug!(mine = mine_id.get(), chained, "mine detonated");
        refund(registry, placer, mine_id, out_events);

        for id in registry.ids() {
            if id == mine_id {
                continue;
            }
            let Some(other) = registry.get_mut(id) else {
                continue;
            };
            if !other.is_live() || other.position.distance_squared(center) >= reach {
                continue;
            }
            match other.kind() {
                EntityKind::Wall => {}
                EntityKind::Mine => worklist.push((id, true)),
                EntityKind::Bullet => other.pending_removal = true,
                EntityKind::Player | EntityKind::Mob | EntityKind::Boss => {
                    kill(other, out_events);
                }
            }
        }
    }
}

fn refund(
    registry: &mut EntityRegistry,
    placer: EntityId,
    mine: EntityId,
    out_events: &mut Vec<Event>,
) {
    let Some(combatant) = registry
        .get_mut(placer)
        .filter(|entity| !entity.pending_removal)
        .and_then(Entity::combatant_mut)
    else {
        return;
    };
    combatant.refund_mine();
    out_events.push(Event::MineRefunded { placer, mine });
}

fn kill(entity: &mut Entity, out_events: &mut Vec<Event>) {
    let id = entity.id;
    let Some(combatant) = entity.combatant_mut() else {
        return;
    };
    let remaining = combatant.health.get();
    if remaining <= 0 {
        return;
    }
    combatant.health = Health::new(0);
    out_events.push(Event::EntityDamaged {
        entity: id,
        damage: remaining.unsigned_abs(),
        remaining: combatant.health,
    });
}

/// Starts death sequences, retires finished animations and reports a fallen player.
///
/// Mobs and bosses are flagged for removal once their death sequence ends;
/// exploded mines once their explosion ends. The player stays in place so the
/// presentation can keep showing the final frame.
pub(crate) fn update_vitality(
    registry: &mut EntityRegistry,
    now: Duration,
    animation: &AnimationTuning,
    out_events: &mut Vec<Event>,
) -> Option<EntityId> {
    let death = animation.death_duration();
    let explosion = animation.explosion_duration();
    let mut fallen_player = None;

    for id in registry.combatant_ids() {
        let Some(entity) = registry.get_mut(id) else {
            continue;
        };
        if entity.pending_removal {
            continue;
        }
        let is_player = entity.kind() == EntityKind::Player;
        let Some(combatant) = entity.combatant_mut() else {
            continue;
        };

        if combatant.begin_dying(now) {
            if is_player {
                out_events.push(Event::PlayerDied { player: id });
                fallen_player = Some(id);
            } else {
                out_events.push(Event::EntityDying { entity: id });
            }
        }

        let finished = match combatant.vitality {
            Vitality::Alive => continue,
            Vitality::Dying { since } => now.saturating_sub(since) >= death,
        };
        entity.velocity = Vec2::ZERO;
        if finished && !is_player {
            entity.pending_removal = true;
        }
    }

    for id in registry.mine_ids() {
        let Some(entity) = registry.get_mut(id) else {
            continue;
        };
        if let Body::Mine(MineBody {
            phase: MinePhase::Detonated { at },
            ..
        }) = entity.body
        {
            if now.saturating_sub(at) >= explosion {
                entity.pending_removal = true;
            }
        }
    }

    fallen_player
}
