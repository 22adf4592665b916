//! Cleanup system: despawns dead units and spent projectiles.

use hecs::{Entity, World};
use log::info;

use bulwark_core::components::UnitInfo;
use bulwark_core::enums::UnitKind;
use bulwark_core::events::SimEvent;
use bulwark_core::stats::StatBlock;

use crate::components::Projectile;
use crate::event_bus::EventBus;
use crate::registry::{EntityRegistry, Group};
use crate::world_setup::entity_id;

/// What a cleanup pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalSummary {
    pub enemies_removed: u32,
    pub players_removed: u32,
    pub firedoor_destroyed: bool,
}

impl RemovalSummary {
    pub fn enemy_removed(&self) -> bool {
        self.enemies_removed > 0
    }
}

/// Remove dead units (announcing each) and spent projectiles.
/// `despawn_buffer` is reused across ticks.
pub fn run(
    world: &mut World,
    registry: &mut EntityRegistry,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut EventBus,
) -> RemovalSummary {
    despawn_buffer.clear();
    let mut summary = RemovalSummary::default();

    let mut dead: Vec<(Entity, UnitInfo)> = world
        .query::<(&UnitInfo, &StatBlock)>()
        .iter()
        .filter(|(_, (_, stats))| !stats.is_alive())
        .map(|(entity, (info, _))| (entity, *info))
        .collect();
    // World iteration order follows archetypes; sort for stable event order.
    dead.sort_by_key(|(entity, _)| entity_id(*entity));

    for (entity, info) in dead {
        match registry.remove(entity) {
            Some(Group::Enemy) => summary.enemies_removed += 1,
            Some(Group::Player) => summary.players_removed += 1,
            Some(Group::Structure) | None => {}
        }
        if info.kind == UnitKind::Firedoor {
            info!("firedoor destroyed");
            summary.firedoor_destroyed = true;
            events.emit(SimEvent::FiredoorDestroyed);
        }
        events.emit(SimEvent::EntityRemoved {
            entity: entity_id(entity),
            kind: info.kind,
            code: info.code,
        });
        despawn_buffer.push(entity);
    }

    for (entity, projectile) in world.query_mut::<&Projectile>() {
        if projectile.spent {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    summary
}
