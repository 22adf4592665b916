//! Projectile system: homing flight, contact damage, expiry.
//!
//! Projectiles carry no `Velocity`; this system moves them itself so the
//! unit movement pass never touches them.

use std::collections::HashMap;

use hecs::{Entity, World};
use log::trace;

use bulwark_combat::damage::apply_damage;
use bulwark_combat::targeting::{find_nearest_target, hostile_to};
use bulwark_core::events::SimEvent;
use bulwark_core::stats::StatBlock;
use bulwark_core::types::Position;

use crate::components::Projectile;
use crate::event_bus::EventBus;
use crate::systems::combat::collect_candidates;
use crate::world_setup::entity_id;

struct Hit {
    owner: Entity,
    victim: Entity,
    damage: i32,
}

/// Fly every live projectile one step. A projectile is spent on its first
/// contact with a hostile unit, or when its lifetime runs out.
pub fn run(world: &mut World, dt: f32, events: &mut EventBus) {
    let candidates = collect_candidates(world);
    let alive: HashMap<Entity, glam::Vec2> = candidates
        .iter()
        .filter(|c| c.alive)
        .map(|c| (c.handle, c.position))
        .collect();

    let mut hits = Vec::new();
    for (_entity, (projectile, pos)) in world.query_mut::<(&mut Projectile, &mut Position)>() {
        if projectile.spent {
            continue;
        }
        let aim = alive.get(&projectile.target).copied();
        let spec = projectile.spec;
        pos.0 += projectile.flight.advance(pos.0, aim, &spec, dt);

        let victim = find_nearest_target(
            pos.0,
            spec.hit_radius,
            &candidates,
            hostile_to(projectile.faction),
        );
        if let Some(victim) = victim {
            hits.push(Hit {
                owner: projectile.owner,
                victim: victim.handle,
                damage: projectile.damage,
            });
            projectile.spent = true;
        } else if projectile.flight.expired(&spec) {
            trace!("projectile from {:?} expired", projectile.owner);
            projectile.spent = true;
        }
    }

    for hit in hits {
        let Ok(mut stats) = world.get::<&mut StatBlock>(hit.victim) else {
            continue;
        };
        if !stats.is_alive() {
            continue;
        }
        let outcome = apply_damage(&mut stats, hit.damage as f32);
        events.emit(SimEvent::AttackPerformed {
            attacker: entity_id(hit.owner),
            target: entity_id(hit.victim),
            damage: outcome.applied,
        });
    }
}
