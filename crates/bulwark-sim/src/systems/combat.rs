//! Combat systems: periodic target checks and attack cooldowns.
//!
//! Both passes read a candidate list built before any mutation, so every
//! unit in a tick sees the same world.

use std::collections::HashMap;

use hecs::{Entity, World};
use log::debug;

use bulwark_combat::damage::apply_damage;
use bulwark_combat::fsm::Transition;
use bulwark_combat::targeting::{find_nearest_target, hostile_to, Candidate};
use bulwark_core::components::{RangedAttack, UnitInfo};
use bulwark_core::enums::Faction;
use bulwark_core::events::SimEvent;
use bulwark_core::stats::StatBlock;
use bulwark_core::types::{Position, Velocity};

use crate::components::UnitCombat;
use crate::event_bus::EventBus;
use crate::world_setup::{self, entity_id};

/// Everything that can be aimed at, in world iteration order.
pub fn collect_candidates(world: &World) -> Vec<Candidate<Entity>> {
    world
        .query::<(&Position, &Faction, &StatBlock, &UnitInfo)>()
        .iter()
        .map(|(entity, (pos, faction, stats, _))| Candidate {
            handle: entity,
            position: pos.0,
            faction: *faction,
            alive: stats.is_alive(),
        })
        .collect()
}

/// Run due target checks. Engaging units stop walking immediately.
pub fn update_targets(world: &mut World, dt: f32, check_interval: f32) {
    let candidates = collect_candidates(world);
    let alive: HashMap<Entity, glam::Vec2> = candidates
        .iter()
        .filter(|c| c.alive)
        .map(|c| (c.handle, c.position))
        .collect();

    for (entity, (pos, faction, stats, combat, vel)) in world.query_mut::<(
        &Position,
        &Faction,
        &StatBlock,
        &mut UnitCombat,
        &mut Velocity,
    )>() {
        if !stats.is_alive() || !combat.tick_check_timer(dt, check_interval) {
            continue;
        }
        let range = stats.attack_range();
        let held = combat.target().and_then(|t| alive.get(&t).copied());
        let transition = combat.evaluate_target(pos.0, range, held, || {
            find_nearest_target(pos.0, range, &candidates, hostile_to(*faction)).map(|c| c.handle)
        });
        match transition {
            Some(Transition::Engaged { target }) => {
                vel.0 = glam::Vec2::ZERO;
                debug!("{entity:?} engaged {target:?}");
            }
            Some(Transition::Disengaged { target, reason }) => {
                debug!("{entity:?} released {target:?}: {reason:?}");
            }
            None => {}
        }
    }
}

/// An attack whose cooldown completed this tick.
#[derive(Debug, Clone, Copy)]
struct AttackIntent {
    attacker: Entity,
    target: Entity,
    origin: glam::Vec2,
    faction: Faction,
    damage: i32,
    ranged: Option<RangedAttack>,
}

/// Advance cooldowns and resolve due attacks. Melee damage lands at once;
/// ranged attackers launch a projectile.
pub fn update_attacks(world: &mut World, dt: f32, fallback_cooldown: f32, events: &mut EventBus) {
    let mut intents = Vec::new();
    for (attacker, (pos, faction, stats, combat, ranged)) in world.query_mut::<(
        &Position,
        &Faction,
        &StatBlock,
        &mut UnitCombat,
        Option<&RangedAttack>,
    )>() {
        if !stats.is_alive() {
            continue;
        }
        let interval = stats.attack_interval(fallback_cooldown);
        if let Some(target) = combat.tick_cooldown(dt, interval) {
            intents.push(AttackIntent {
                attacker,
                target,
                origin: pos.0,
                faction: *faction,
                damage: stats.attack_damage(),
                ranged: ranged.copied(),
            });
        }
    }

    for intent in intents {
        let attacker_alive = world
            .get::<&StatBlock>(intent.attacker)
            .is_ok_and(|s| s.is_alive());
        if !attacker_alive {
            continue;
        }
        let aim = target_position(world, intent.target);
        let Some(aim) = aim else {
            if let Ok(mut combat) = world.get::<&mut UnitCombat>(intent.attacker) {
                combat.abort_attack();
            }
            continue;
        };

        match intent.ranged {
            Some(RangedAttack(spec)) => {
                world_setup::spawn_projectile(
                    world,
                    intent.attacker,
                    intent.target,
                    intent.faction,
                    intent.origin,
                    aim,
                    intent.damage,
                    spec,
                );
            }
            None => {
                if let Ok(mut stats) = world.get::<&mut StatBlock>(intent.target) {
                    let outcome = apply_damage(&mut stats, intent.damage as f32);
                    events.emit(SimEvent::AttackPerformed {
                        attacker: entity_id(intent.attacker),
                        target: entity_id(intent.target),
                        damage: outcome.applied,
                    });
                }
            }
        }
        if let Ok(mut combat) = world.get::<&mut UnitCombat>(intent.attacker) {
            combat.record_attack();
        }
    }
}

/// Position of a live target, `None` if it is gone or dead.
fn target_position(world: &World, target: Entity) -> Option<glam::Vec2> {
    let stats = world.get::<&StatBlock>(target).ok()?;
    if !stats.is_alive() {
        return None;
    }
    world.get::<&Position>(target).ok().map(|p| p.0)
}
